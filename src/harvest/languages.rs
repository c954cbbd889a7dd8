//! Language to trending-page slug mapping

use std::collections::BTreeMap;

/// Slugs for languages whose names do not map to their URL segment by lowercasing
const BUILTIN_SLUGS: &[(&str, &str)] = &[
    ("C++", "c%2B%2B"),
    ("C#", "c%23"),
    ("F#", "f%23"),
    ("Objective-C", "objective-c"),
    ("Objective-C++", "objective-c%2B%2B"),
    ("Jupyter Notebook", "jupyter-notebook"),
    ("Vim Script", "vim-script"),
    ("Emacs Lisp", "emacs-lisp"),
    ("Common Lisp", "common-lisp"),
    ("Visual Basic .NET", "visual-basic-.net"),
];

/// Immutable language→slug table
///
/// Built once from the built-in entries plus configuration overrides and
/// passed to the collector; there is no global table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTable {
    slugs: BTreeMap<String, String>,
}

impl LanguageTable {
    /// Built-in table extended (or overridden) by `overrides`
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut slugs: BTreeMap<String, String> = BUILTIN_SLUGS
            .iter()
            .map(|(language, slug)| (language.to_string(), slug.to_string()))
            .collect();
        slugs.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { slugs }
    }

    /// URL segment for a language
    ///
    /// Unknown languages are lowercased with spaces turned into hyphens.
    pub fn slug(&self, language: &str) -> String {
        match self.slugs.get(language) {
            Some(slug) => slug.clone(),
            None => language.trim().to_lowercase().replace(' ', "-"),
        }
    }

    /// `<base>/trending/<slug>?since=<since>`
    pub fn url_for(&self, base_url: &str, language: &str, since: &str) -> String {
        format!(
            "{}/trending/{}?since={}",
            base_url.trim_end_matches('/'),
            self.slug(language),
            since
        )
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::with_overrides(&BTreeMap::new())
    }
}
