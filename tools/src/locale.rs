//! Localized labels for the console presentation.
//!
//! The core never formats text; everything the player reads comes from here.
//! The status log is not localized and always stays English.

use crash_core::outcome::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translations {
    pub code:          &'static str,
    pub get_start:     &'static str,
    pub panel_title:   &'static str,
    pub crush_label:   &'static str,
    pub result_suffix: &'static str,
    pub results:       &'static str,
    pub languages:     &'static str,
}

pub const EN: Translations = Translations {
    code:          "en",
    get_start:     "GET START",
    panel_title:   "> SIGNAL CONSOLE — ANALYTICS",
    crush_label:   "CRUSH",
    result_suffix: "x",
    results:       "Results",
    languages:     "Languages",
};

pub const RU: Translations = Translations {
    code:          "ru",
    get_start:     "СТАРТ",
    panel_title:   "> КОНСОЛЬ СИГНАЛОВ — АНАЛИТИКА",
    crush_label:   "КРАШ",
    result_suffix: "x",
    results:       "Результаты",
    languages:     "Языки",
};

pub const ES: Translations = Translations {
    code:          "es",
    get_start:     "INICIAR",
    panel_title:   "> CONSOLA DE SEÑAL — ANALÍTICA",
    crush_label:   "CRASH",
    result_suffix: "x",
    results:       "Resultados",
    languages:     "Idiomas",
};

pub const ALL: [&Translations; 3] = [&EN, &RU, &ES];

/// Table for `code`, if we ship one.
pub fn lookup(code: &str) -> Option<&'static Translations> {
    ALL.iter().copied().find(|t| t.code.eq_ignore_ascii_case(code))
}

/// Table for `code`, falling back to English.
pub fn lookup_or_default(code: &str) -> &'static Translations {
    lookup(code).unwrap_or_else(|| {
        log::warn!("No translations for '{code}', using en");
        &EN
    })
}

/// `CRUSH`, or the multiplier without trailing zeros: `2.3x`, `12x`.
pub fn outcome_label(outcome: &Outcome, t: &Translations) -> String {
    match outcome {
        Outcome::Bust => t.crush_label.to_string(),
        Outcome::Multiplier(m) => {
            let digits = m.to_string();
            let trimmed = digits.trim_end_matches('0').trim_end_matches('.');
            format!("{trimmed}{}", t.result_suffix)
        }
    }
}
