use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // Letter/digit runs, optionally joined by single '-' or '.' ("double-digit", "D.C").
    static ref RE: Regex = Regex::new(r"[\p{L}\p{N}]+(?:[-.][\p{L}\p{N}]+)*").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "i","me","my","myself","we","our","ours","ourselves","you","you're","you've","you'll","you'd",
            "your","yours","yourself","yourselves","he","him","his","himself","she","she's","her","hers",
            "herself","it","it's","its","itself","they","them","their","theirs","themselves",
            "what","which","who","whom","this","that","that'll","these","those",
            "am","is","are","was","were","be","been","being","have","has","had","having","do","does","did","doing",
            "a","an","the","and","but","if","or","because","as","until","while","of","at","by","for","with",
            "about","against","between","into","through","during","before","after","above","below",
            "to","from","up","down","in","out","on","off","over","under","again","further","then","once",
            "here","there","when","where","why","how","all","any","both","each","few","more","most","other",
            "some","such","no","nor","not","only","own","same","so","than","too","very",
            "s","t","can","will","just","don","don't","should","should've","now",
            "d","ll","m","o","re","ve","y","ain","aren","aren't","couldn","couldn't","didn","didn't",
            "doesn","doesn't","hadn","hadn't","hasn","hasn't","haven","haven't","isn","isn't","ma",
            "mightn","mightn't","mustn","mustn't","needn","needn't","shan","shan't","shouldn","shouldn't",
            "wasn","wasn't","weren","weren't","won","won't","wouldn","wouldn't"
        ];
        words.iter().copied().collect()
    };
}

/// Built-in English stopword list, used unless a normalizer config overrides it.
pub fn default_stopwords() -> &'static HashSet<&'static str> {
    &STOPWORDS
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Split text into raw tokens after NFKC normalization.
///
/// Case is preserved and apostrophes split clitics (`don't` -> `don`, `t`), so the
/// stopword classification done on raw query tokens sees the same pieces the
/// normalizer does. Documents and queries must both go through this function.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>();
    RE.find_iter(&normalized).map(|mat| mat.as_str().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Running, runner's run!");
        assert_eq!(t, vec!["Running", "runner", "s", "run"]);
    }

    #[test]
    fn keeps_joined_forms() {
        let t = tokenize("a double-digit drop in D.C. since 1963");
        assert!(t.contains(&"double-digit".to_string()));
        assert!(t.contains(&"D.C".to_string()));
        assert!(t.contains(&"1963".to_string()));
    }

    #[test]
    fn nfkc_folds_compatibility_forms() {
        // no-break space and fullwidth digits
        let t = tokenize("63\u{a0}percent \u{ff12}\u{ff10}\u{ff11}\u{ff11}");
        assert_eq!(t, vec!["63", "percent", "2011"]);
    }
}
