//! Context-free part-of-speech tagger.
//!
//! A closed-class lexicon plus suffix rules, emitting Penn Treebank codes. It looks
//! at one lowercased token at a time, so a word receives the same tag in a document
//! and in a query; that property matters more here than tagging accuracy.

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Conjunction,
    Cardinal,
    Determiner,
    Existential,
    Preposition,
    Adjective,
    Superlative,
    Modal,
    Noun,
    PluralNoun,
    Pronoun,
    PossessivePronoun,
    Adverb,
    Particle,
    To,
    Interjection,
    Verb,
    PastTense,
    Gerund,
    PastParticiple,
    Present,
    ThirdPerson,
    WhDeterminer,
    WhPronoun,
    WhPossessive,
    WhAdverb,
}

impl Tag {
    const ALL: [Tag; 26] = [
        Tag::Conjunction, Tag::Cardinal, Tag::Determiner, Tag::Existential, Tag::Preposition,
        Tag::Adjective, Tag::Superlative, Tag::Modal, Tag::Noun, Tag::PluralNoun, Tag::Pronoun,
        Tag::PossessivePronoun, Tag::Adverb, Tag::Particle, Tag::To, Tag::Interjection, Tag::Verb,
        Tag::PastTense, Tag::Gerund, Tag::PastParticiple, Tag::Present, Tag::ThirdPerson,
        Tag::WhDeterminer, Tag::WhPronoun, Tag::WhPossessive, Tag::WhAdverb,
    ];

    /// Inverse of [`Tag::as_str`]; codes are case-sensitive.
    pub fn from_code(code: &str) -> Option<Tag> {
        Tag::ALL.iter().copied().find(|tag| tag.as_str() == code)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Conjunction => "CC",
            Tag::Cardinal => "CD",
            Tag::Determiner => "DT",
            Tag::Existential => "EX",
            Tag::Preposition => "IN",
            Tag::Adjective => "JJ",
            Tag::Superlative => "JJS",
            Tag::Modal => "MD",
            Tag::Noun => "NN",
            Tag::PluralNoun => "NNS",
            Tag::Pronoun => "PRP",
            Tag::PossessivePronoun => "PRP$",
            Tag::Adverb => "RB",
            Tag::Particle => "RP",
            Tag::To => "TO",
            Tag::Interjection => "UH",
            Tag::Verb => "VB",
            Tag::PastTense => "VBD",
            Tag::Gerund => "VBG",
            Tag::PastParticiple => "VBN",
            Tag::Present => "VBP",
            Tag::ThirdPerson => "VBZ",
            Tag::WhDeterminer => "WDT",
            Tag::WhPronoun => "WP",
            Tag::WhPossessive => "WP$",
            Tag::WhAdverb => "WRB",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

lazy_static! {
    static ref LEXICON: HashMap<&'static str, Tag> = {
        let groups: &[(Tag, &[&str])] = &[
            (Tag::Determiner, &["a","an","the","this","that","these","those","every","each","some","any","no",
                "another","all","both","either","neither"]),
            (Tag::Preposition, &["about","above","across","after","against","along","amid","among","around","as",
                "at","because","before","behind","below","beneath","beside","besides","between","beyond","by",
                "despite","during","except","for","from","if","in","inside","into","like","near","of","on","onto",
                "outside","over","per","since","than","through","throughout","toward","towards","under","unless",
                "until","upon","via","whether","while","with","within","without","although","though","unlike"]),
            (Tag::Particle, &["up","out","off","down","away","back"]),
            (Tag::To, &["to"]),
            (Tag::Conjunction, &["and","but","or","nor","yet","plus"]),
            (Tag::Pronoun, &["i","me","you","he","him","she","it","we","us","they","them","myself","yourself",
                "himself","herself","itself","ourselves","yourselves","themselves"]),
            (Tag::PossessivePronoun, &["my","your","his","her","its","our","their"]),
            (Tag::Modal, &["can","could","may","might","must","shall","should","will","would"]),
            (Tag::Existential, &["there"]),
            (Tag::WhDeterminer, &["which","whatever"]),
            (Tag::WhPronoun, &["who","whom","what"]),
            (Tag::WhPossessive, &["whose"]),
            (Tag::WhAdverb, &["when","where","why","how"]),
            (Tag::ThirdPerson, &["is","has","does","says"]),
            (Tag::Present, &["are","am","have","do"]),
            (Tag::PastTense, &["was","were","had","did","said","saw","went","came","made","took","got"]),
            (Tag::PastParticiple, &["been","done","gone","seen","taken","given"]),
            (Tag::Gerund, &["being"]),
            (Tag::Verb, &["be"]),
            (Tag::Adverb, &["not","very","too","also","just","only","now","then","here","never","always","often",
                "even","still","quite","already","almost","again","soon","so"]),
            (Tag::Interjection, &["oh","yes","hello","ok"]),
            (Tag::Cardinal, &["zero","one","two","three","four","five","six","seven","eight","nine","ten",
                "eleven","twelve","thirteen","fourteen","fifteen","sixteen","seventeen","eighteen","nineteen",
                "twenty","thirty","forty","fifty","sixty","seventy","eighty","ninety","hundred","thousand",
                "million","billion"]),
        ];
        let mut map = HashMap::new();
        for (tag, words) in groups {
            for word in *words {
                map.entry(*word).or_insert(*tag);
            }
        }
        map
    };
}

const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "able", "ible", "ive", "less", "ical", "ish", "ic"];
const NOUN_SUFFIXES: &[&str] = &["tion", "sion", "ment", "ness", "ity", "ance", "ence", "ship", "ism", "ist"];

/// Tag a single token. The token is lowercased before lookup.
pub fn tag(token: &str) -> Tag {
    let word = token.to_lowercase();
    if let Some(tag) = LEXICON.get(word.as_str()) {
        return *tag;
    }
    if word.starts_with(|c: char| c.is_ascii_digit()) {
        return if ["st", "nd", "rd", "th"].iter().any(|s| word.ends_with(s)) {
            Tag::Adjective
        } else {
            Tag::Cardinal
        };
    }
    if word.contains('-') {
        return Tag::Adjective;
    }

    let len = word.chars().count();
    if NOUN_SUFFIXES.iter().any(|s| word.ends_with(s)) {
        Tag::Noun
    } else if len > 4 && word.ends_with("ly") {
        Tag::Adverb
    } else if len > 4 && word.ends_with("ing") {
        Tag::Gerund
    } else if len > 3 && word.ends_with("ed") {
        Tag::PastTense
    } else if len > 4 && word.ends_with("est") {
        Tag::Superlative
    } else if ADJECTIVE_SUFFIXES.iter().any(|s| word.ends_with(s)) {
        Tag::Adjective
    } else if len > 3 && word.ends_with('s') && !["ss", "us", "is"].iter().any(|s| word.ends_with(s)) {
        Tag::PluralNoun
    } else {
        Tag::Noun
    }
}
