//! Terminal presentation sink.
//!
//! Text mode renders the round the way a player would watch it; JSON mode
//! writes one event per line for a UI process reading our stdout.

use crate::locale::{outcome_label, Translations};
use crash_core::{
    error::{RoundError, RoundResult},
    event::{RoundEvent, RoundState},
    history::HistoryEntry,
    presentation::PresentationSink,
};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct ConsoleSink<W: Write> {
    out:  W,
    mode: OutputMode,
    lang: &'static Translations,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, mode: OutputMode, lang: &'static Translations) -> Self {
        Self { out, mode, lang }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    /// The results panel: title plus one label per entry.
    pub fn render_history(&mut self, entries: &[HistoryEntry]) -> std::io::Result<()> {
        let labels: Vec<String> = entries.iter().map(|e| outcome_label(&e.outcome, self.lang)).collect();
        writeln!(self.out, "{}: {}", self.lang.results, labels.join("  "))
    }

    fn render_text(&mut self, event: &RoundEvent) -> std::io::Result<()> {
        match event {
            RoundEvent::PhaseChanged { round, state: RoundState::Logging } => {
                writeln!(self.out, "── round {round} ──")?;
                writeln!(self.out, "{}", self.lang.panel_title)?;
            }
            RoundEvent::PhaseChanged { state: RoundState::Idle, .. } => {
                writeln!(self.out, "[ {} ]", self.lang.get_start)?;
            }
            RoundEvent::PhaseChanged { .. } | RoundEvent::LogCleared | RoundEvent::OutcomeCleared => {}
            RoundEvent::LogCharacterAppended { ch } => write!(self.out, "{ch}")?,
            RoundEvent::LogHidden => writeln!(self.out)?,
            RoundEvent::PositionUpdate { x, y, angle } => {
                log::trace!("object at ({x:.1}, {y:.1}) angle {angle:.2}");
            }
            RoundEvent::ImpactTriggered { x, y } => {
                writeln!(self.out, "  * impact at ({x:.0}, {y:.0})")?;
            }
            RoundEvent::ObjectVisibility { visible } => {
                log::trace!("object visible: {visible}");
            }
            RoundEvent::OutcomeRevealed { outcome, .. } => {
                writeln!(self.out, "  >> {}", outcome_label(outcome, self.lang))?;
            }
            RoundEvent::HistoryChanged { entries } => self.render_history(entries)?,
        }
        self.out.flush()
    }
}

impl<W: Write> PresentationSink for ConsoleSink<W> {
    fn emit(&mut self, event: RoundEvent) -> RoundResult<()> {
        let written = match self.mode {
            OutputMode::Text => self.render_text(&event),
            OutputMode::Json => serde_json::to_string(&event)
                .map_err(std::io::Error::from)
                .and_then(|line| writeln!(self.out, "{line}"))
                .and_then(|_| self.out.flush()),
        };
        written.map_err(|e| RoundError::unavailable(format!("console: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::{EN, RU};
    use crash_core::outcome::Outcome;

    fn text(sink: ConsoleSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn text_mode_types_the_log_and_labels_outcomes() {
        let mut sink = ConsoleSink::new(Vec::new(), OutputMode::Text, &EN);
        sink.emit(RoundEvent::LogCharacterAppended { ch: 'o' }).unwrap();
        sink.emit(RoundEvent::LogCharacterAppended { ch: 'k' }).unwrap();
        sink.emit(RoundEvent::LogHidden).unwrap();
        sink.emit(RoundEvent::OutcomeRevealed { outcome: Outcome::Bust, x: 1.0, y: 2.0 }).unwrap();
        assert_eq!(text(sink), "ok\n  >> CRUSH\n");
    }

    #[test]
    fn results_panel_uses_the_chosen_language() {
        let mut sink = ConsoleSink::new(Vec::new(), OutputMode::Text, &RU);
        sink.emit(RoundEvent::HistoryChanged { entries: vec![] }).unwrap();
        assert_eq!(text(sink), "Результаты: \n");
    }

    #[test]
    fn json_mode_writes_one_event_per_line() {
        let mut sink = ConsoleSink::new(Vec::new(), OutputMode::Json, &EN);
        sink.emit(RoundEvent::ImpactTriggered { x: 3.0, y: 4.0 }).unwrap();
        sink.emit(RoundEvent::OutcomeCleared).unwrap();
        let out = text(sink);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"type":"impact_triggered","x":3.0,"y":4.0}"#);
        assert_eq!(lines[1], r#"{"type":"outcome_cleared"}"#);
    }
}
