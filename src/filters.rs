use crate::types::FilterFacet;
use std::fmt;

/// Which filter table a name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Language,
    Source,
}

impl FilterKind {
    fn table(self) -> &'static [(&'static str, u32)] {
        match self {
            FilterKind::Language => LANGUAGES,
            FilterKind::Source => SOURCES,
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Language => f.write_str("language"),
            FilterKind::Source => f.write_str("source"),
        }
    }
}

/// A filter name that is not present in its table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} filter: {name:?}")]
pub struct UnknownFilterError {
    pub kind: FilterKind,
    pub name: String,
}

// Hand-maintained; not generated from the service. Searches compare the
// facets the service returns against these tables (see `facet_drift`) and
// log any id that disagrees.

/// Language facets (name, id)
pub const LANGUAGES: &[(&str, u32)] = &[
    ("ActionScript", 1),
    ("Ada", 2),
    ("Assembly", 3),
    ("AWK", 4),
    ("Bash", 5),
    ("C", 6),
    ("C#", 7),
    ("C++", 8),
    ("Clojure", 9),
    ("CMake", 10),
    ("COBOL", 11),
    ("CoffeeScript", 12),
    ("Common Lisp", 13),
    ("CSS", 14),
    ("D", 15),
    ("Dart", 16),
    ("Delphi", 17),
    ("Elixir", 18),
    ("Elm", 19),
    ("Emacs Lisp", 20),
    ("Erlang", 21),
    ("F#", 22),
    ("Fortran", 23),
    ("Go", 24),
    ("Groovy", 25),
    ("Haskell", 26),
    ("HTML", 27),
    ("Java", 28),
    ("JavaScript", 29),
    ("JSON", 30),
    ("Julia", 31),
    ("Kotlin", 32),
    ("Lua", 33),
    ("Makefile", 34),
    ("Markdown", 35),
    ("MATLAB", 36),
    ("Nim", 37),
    ("Objective C", 38),
    ("OCaml", 39),
    ("Pascal", 40),
    ("Perl", 41),
    ("PHP", 42),
    ("PowerShell", 43),
    ("Prolog", 44),
    ("Python", 45),
    ("R", 46),
    ("Racket", 47),
    ("Ruby", 48),
    ("Rust", 49),
    ("Scala", 50),
    ("Scheme", 51),
    ("Shell", 52),
    ("SQL", 53),
    ("Swift", 54),
    ("Tcl", 55),
    ("TeX", 56),
    ("TypeScript", 57),
    ("Verilog", 58),
    ("VHDL", 59),
    ("Vim Script", 60),
    ("Visual Basic", 61),
    ("XML", 62),
    ("YAML", 63),
    ("Zig", 64),
];

/// Code source facets (name, id)
pub const SOURCES: &[(&str, u32)] = &[
    ("Google Code", 1),
    ("GitHub", 2),
    ("Bitbucket", 3),
    ("CodePlex", 4),
    ("Sourceforge", 5),
    ("Fedora Project", 6),
    ("GitLab", 7),
    ("Gitorious", 8),
    ("Tizen", 9),
    ("Android", 10),
    ("Minix3", 11),
    ("Seafile", 12),
];

/// Resolve names from one table into wire ids, keeping input order.
///
/// Names are matched case-insensitively after trimming. The first unknown name
/// aborts the whole resolution; unknown names are never dropped.
pub fn ids_for<S: AsRef<str>>(kind: FilterKind, names: &[S]) -> Result<Vec<u32>, UnknownFilterError> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            lookup_id(kind, name).ok_or_else(|| UnknownFilterError {
                kind,
                name: name.to_string(),
            })
        })
        .collect()
}

pub fn language_ids<S: AsRef<str>>(names: &[S]) -> Result<Vec<u32>, UnknownFilterError> {
    ids_for(FilterKind::Language, names)
}

pub fn source_ids<S: AsRef<str>>(names: &[S]) -> Result<Vec<u32>, UnknownFilterError> {
    ids_for(FilterKind::Source, names)
}

/// Canonical name for a language id
pub fn language_name(id: u32) -> Option<&'static str> {
    lookup_name(FilterKind::Language, id)
}

/// Canonical name for a source id
pub fn source_name(id: u32) -> Option<&'static str> {
    lookup_name(FilterKind::Source, id)
}

/// A facet the service reported whose id does not match the built-in table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetDrift {
    pub kind: FilterKind,
    pub name: String,
    pub service_id: u32,
    /// Id in the built-in table, `None` when the name is missing from it
    pub table_id: Option<u32>,
}

/// Compare service-reported facets with the built-in table for `kind`.
///
/// Names are matched the same way as [`ids_for`]. Facets that agree are not
/// returned.
pub fn facet_drift(kind: FilterKind, facets: &[FilterFacet]) -> Vec<FacetDrift> {
    facets
        .iter()
        .filter_map(|facet| {
            let table_id = lookup_id(kind, &facet.name);
            (table_id != Some(facet.id)).then(|| FacetDrift {
                kind,
                name: facet.name.clone(),
                service_id: facet.id,
                table_id,
            })
        })
        .collect()
}

fn lookup_id(kind: FilterKind, name: &str) -> Option<u32> {
    let name = name.trim();
    kind.table()
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|(_, id)| *id)
}

fn lookup_name(kind: FilterKind, id: u32) -> Option<&'static str> {
    kind.table()
        .iter()
        .find(|(_, candidate)| *candidate == id)
        .map(|(name, _)| *name)
}
