//! Translation vocabularies for report text and the relation sort order.

use crate::value::{Number, Value};

/// Vocabulary selected by `translate(kind)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vocabulary {
    /// Patient sex.
    Gender,
    /// Family relation to the index patient.
    Relation,
    /// Variant zygosity.
    Zygosity,
    /// ACMG variant classification, by label or class number 1 to 5.
    Acmg,
}

const GENDER: &[(&str, &str)] = &[
    ("Male", "männlich"),
    ("Female", "weiblich"),
    ("Diverse", "divers"),
];

const RELATION: &[(&str, &str)] = &[
    ("Index", "Indexpatient"),
    ("Mother", "Mutter"),
    ("Father", "Vater"),
    ("Sibling", "Geschwister"),
    ("Brother", "Bruder"),
    ("Sister", "Schwester"),
    ("Son", "Sohn"),
    ("Daughter", "Tochter"),
    ("Other", "Sonstige"),
];

const ZYGOSITY: &[(&str, &str)] = &[
    ("Heterozygous", "heterozygot"),
    ("Homozygous", "homozygot"),
    ("Hemizygous", "hemizygot"),
    ("Homoplasmic", "homoplasmisch"),
    ("Heteroplasmic", "heteroplasmisch"),
    ("Mosaic", "Mosaik"),
];

const ACMG: &[(&str, &str)] = &[
    ("Benign (I)", "benigne (Klasse 1)"),
    ("Likely Benign (II)", "wahrscheinlich benigne (Klasse 2)"),
    ("Uncertain Significance (III)", "unklare Signifikanz (Klasse 3)"),
    ("Likely Pathogenic (IV)", "wahrscheinlich pathogen (Klasse 4)"),
    ("Pathogenic (V)", "pathogen (Klasse 5)"),
];

impl Vocabulary {
    /// All vocabularies, in the order `translate()` searches them.
    pub const ALL: [Vocabulary; 4] = [
        Vocabulary::Gender,
        Vocabulary::Relation,
        Vocabulary::Zygosity,
        Vocabulary::Acmg,
    ];

    /// Resolves the kind literal of `translate(kind)`, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|vocabulary| vocabulary.name().eq_ignore_ascii_case(name))
    }

    /// Kind literal naming this vocabulary.
    pub fn name(self) -> &'static str {
        match self {
            Vocabulary::Gender => "gender",
            Vocabulary::Relation => "relation",
            Vocabulary::Zygosity => "zygosity",
            Vocabulary::Acmg => "acmg",
        }
    }

    fn entries(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Vocabulary::Gender => GENDER,
            Vocabulary::Relation => RELATION,
            Vocabulary::Zygosity => ZYGOSITY,
            Vocabulary::Acmg => ACMG,
        }
    }

    /// Translates a term, matching exactly first and then ignoring case.
    pub fn lookup(self, term: &str) -> Option<&'static str> {
        let entries = self.entries();
        entries
            .iter()
            .find(|(from, _)| *from == term)
            .or_else(|| entries.iter().find(|(from, _)| from.eq_ignore_ascii_case(term)))
            .map(|(_, to)| *to)
    }

    /// Class numbers only translate when `explicit` names the ACMG vocabulary.
    fn lookup_value(self, value: &Value, explicit: bool) -> Option<&'static str> {
        match (self, value) {
            (_, Value::String(term)) => self.lookup(term.trim()),
            (Vocabulary::Acmg, Value::Number(Number::Int(class @ 1..=5))) if explicit => {
                ACMG.get(*class as usize - 1).map(|(_, to)| *to)
            }
            _ => None,
        }
    }
}

/// Translates `value` with one vocabulary, or with the first vocabulary that
/// knows it when `vocabulary` is `None`.
pub(crate) fn translate(vocabulary: Option<Vocabulary>, value: &Value) -> Option<&'static str> {
    match vocabulary {
        Some(vocabulary) => vocabulary.lookup_value(value, true),
        None => Vocabulary::ALL
            .into_iter()
            .find_map(|vocabulary| vocabulary.lookup_value(value, false)),
    }
}

/// Sort rank for `sort(..., "relation")`: index, mother, father, siblings,
/// then everything else. German terms rank like their English originals.
pub(crate) fn relation_rank(value: &Value) -> u8 {
    const ORDER: &[(u8, &[&str])] = &[
        (0, &["Index", "Indexpatient"]),
        (1, &["Mother", "Mutter"]),
        (2, &["Father", "Vater"]),
        (
            3,
            &["Sibling", "Geschwister", "Brother", "Bruder", "Sister", "Schwester"],
        ),
    ];

    let Some(term) = value.as_str().map(str::trim) else {
        return OTHER_RANK;
    };
    ORDER
        .iter()
        .find(|(_, terms)| terms.iter().any(|t| t.eq_ignore_ascii_case(term)))
        .map_or(OTHER_RANK, |(rank, _)| *rank)
}

const OTHER_RANK: u8 = 4;
