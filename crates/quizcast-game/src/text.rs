//! Text normalization and stemming for token-assembly scoring.
//!
//! Question banks are written by humans and answered on phone keyboards, so
//! token matching must shrug off case, accents, spacing, and simple
//! inflection. The pipeline is:
//!
//! 1. [`normalize`] — lowercase, fold Latin diacritics to ASCII, collapse
//!    whitespace runs.
//! 2. [`stem_phrase`] — per word: `-oes` → `-ao`, drop a plural `s`, then
//!    drop one trailing `a`/`e`/`o`.
//!
//! The stem rule is deliberately dumb: no dictionary, one pass, applied
//! identically to bank tokens and submissions, so near-duplicate forms
//! (`medicamento`/`medicamentos`, `infecção`/`infecções`, `rápido`/`rápida`)
//! collapse to the same key on both sides of the comparison.

/// Lowercases, folds diacritics, and collapses whitespace.
pub(crate) fn normalize(input: &str) -> String {
    let folded: String = input.to_lowercase().chars().map(fold_char).collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Stems every word of an already-normalized phrase.
pub(crate) fn stem_phrase(normalized: &str) -> String {
    normalized
        .split(' ')
        .map(stem_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Maps one accented Latin character to its ASCII base form.
fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Strips common inflectional endings from a single word.
///
/// Rules, in order (first plural rule that matches wins):
/// - `…oes` → `…ao` (folded plural of `-ão`), when at least 5 chars
/// - trailing `s` dropped, when at least 4 chars
/// - then one trailing `a`/`e`/`o` dropped, when at least 3 chars remain
fn stem_word(word: &str) -> String {
    let mut stem = word.to_string();

    if stem.len() >= 5 && stem.ends_with("oes") {
        stem.truncate(stem.len() - 3);
        stem.push_str("ao");
    } else if stem.len() >= 4 && stem.ends_with('s') {
        stem.truncate(stem.len() - 1);
    }

    if stem.len() >= 4 && stem.ends_with(['a', 'e', 'o']) {
        stem.truncate(stem.len() - 1);
    }

    stem
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // normalize()
    // =====================================================================

    #[test]
    fn test_normalize_lowercases_and_folds_diacritics() {
        assert_eq!(normalize("Infecção Única"), "infeccao unica");
        assert_eq!(normalize("CORAÇÃO"), "coracao");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  lavar   as \t mãos \n"), "lavar as maos");
    }

    #[test]
    fn test_normalize_plain_ascii_is_untouched() {
        assert_eq!(normalize("plain ascii"), "plain ascii");
    }

    // =====================================================================
    // stem_phrase()
    // =====================================================================

    #[test]
    fn test_stem_collapses_plural_s() {
        assert_eq!(
            stem_phrase(&normalize("medicamentos")),
            stem_phrase(&normalize("medicamento")),
        );
    }

    #[test]
    fn test_stem_collapses_oes_plural() {
        assert_eq!(
            stem_phrase(&normalize("infecções")),
            stem_phrase(&normalize("infecção")),
        );
    }

    #[test]
    fn test_stem_collapses_gendered_forms() {
        assert_eq!(
            stem_phrase(&normalize("rápido")),
            stem_phrase(&normalize("rápida")),
        );
    }

    #[test]
    fn test_stem_leaves_short_words_alone() {
        // Words at or below the length guards must survive intact —
        // "mão"/"mãos" still collapse, but "gás" keeps its s.
        assert_eq!(stem_phrase(&normalize("mãos")), "mao");
        assert_eq!(stem_phrase(&normalize("mão")), "mao");
        assert_eq!(stem_phrase(&normalize("gás")), "gas");
    }

    #[test]
    fn test_stem_distinct_words_stay_distinct() {
        assert_ne!(
            stem_phrase(&normalize("antibiótico")),
            stem_phrase(&normalize("antitérmico")),
        );
    }

    #[test]
    fn test_stem_phrase_stems_each_word() {
        assert_eq!(
            stem_phrase(&normalize("lavar as mãos")),
            stem_phrase(&normalize("lavar as mão")),
        );
    }
}
