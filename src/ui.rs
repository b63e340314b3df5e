//! TUI rendering module.
//!
//! Layout, top to bottom:
//! - Transcription: template DNA over the growing mRNA, polymerase marker
//! - Translation: mRNA codons, ribosome marker, growing protein chain
//! - Reverse translation: protein, chosen codons, template DNA, summary
//! - Event log
//! - Status bar with mode, speed, strategy and track states
//!
//! All colors live here: one scheme for bases, one for amino acid
//! categories.

pub mod glyphs;

use std::ops::Range;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::model::{AppMode, AppState};
use crate::playback::PlaybackState;
use crate::genetic_code::CodonTable;
use crate::sequence::{AminoAcid, Category, Codon};
use crate::session::Track;

/// Height of the status bar.
const STATUS_BAR_HEIGHT: u16 = 1;
const TRANSCRIPTION_HEIGHT: u16 = 5;
const TRANSLATION_HEIGHT: u16 = 5;
const REVERSE_HEIGHT: u16 = 12;
/// Width of the row labels ("mRNA    ").
const LABEL_WIDTH: usize = 9;

/// Color scheme for sequence symbols.
pub trait ColorScheme {
    fn get_color(&self, c: char) -> Color;
}

/// Nucleotide color scheme. T and U share a color.
pub struct NucleotideColorScheme;

impl ColorScheme for NucleotideColorScheme {
    fn get_color(&self, c: char) -> Color {
        match c.to_ascii_uppercase() {
            'A' => Color::Red,
            'C' => Color::Green,
            'G' => Color::Yellow,
            'T' | 'U' => Color::Blue,
            _ => Color::DarkGray,
        }
    }
}

pub fn category_color(category: Category) -> Color {
    match category {
        Category::Nonpolar => Color::Yellow,
        Category::Polar => Color::Green,
        Category::Basic => Color::Blue,
        Category::Acidic => Color::Red,
        Category::Stop => Color::DarkGray,
    }
}

/// Color of a residue. The codon it was read from (or chosen for) decides
/// the category, so a loaded codon table can recolor residues.
pub fn residue_color(table: &CodonTable, amino_acid: AminoAcid, codon: Option<Codon>) -> Color {
    let category = match codon {
        Some(codon) => table.entry(codon).category,
        None => amino_acid.default_category(),
    };
    category_color(category)
}

/// Slice of `len` items of which `width` fit on screen, keeping `focus`
/// visible near the middle.
pub fn visible_window(len: usize, focus: usize, width: usize) -> Range<usize> {
    if len <= width {
        return 0..len;
    }
    let start = focus.saturating_sub(width / 2).min(len - width);
    start..start + width
}

/// Renders the complete UI.
pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(TRANSCRIPTION_HEIGHT),
            Constraint::Length(TRANSLATION_HEIGHT),
            Constraint::Length(REVERSE_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);

    render_transcription_panel(frame, state, main_layout[0]);
    render_translation_panel(frame, state, main_layout[1]);
    render_reverse_panel(frame, state, main_layout[2]);
    render_log_panel(frame, state, main_layout[3]);
    render_status_bar(frame, state, main_layout[4]);

    if state.show_help {
        render_help(frame, area);
    }
}

fn label(text: &str) -> Span<'static> {
    Span::styled(
        format!("{:<width$}", text, width = LABEL_WIDTH),
        Style::default().add_modifier(Modifier::BOLD),
    )
}

fn base_span(c: char, highlighted: bool) -> Span<'static> {
    let color = NucleotideColorScheme.get_color(c);
    let style = if highlighted {
        Style::default()
            .fg(color)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Black).bg(color)
    };
    Span::styled(c.to_string(), style)
}

fn panel(title: String, state: &AppState, track: Track) -> Block<'static> {
    let track_state = state.track_state(track);
    let title = if track_state == PlaybackState::Completed {
        format!("{} [{}] {}", title, track_state, state.glyphs.done)
    } else {
        format!("{} [{}]", title, track_state)
    };
    Block::default().borders(Borders::ALL).title(title)
}

/// Text columns available inside a bordered panel.
fn inner_width(area: Rect) -> usize {
    (area.width.saturating_sub(2) as usize).saturating_sub(LABEL_WIDTH)
}

fn render_transcription_panel(frame: &mut Frame, state: &AppState, area: Rect) {
    let view = &state.transcription;
    let template: Vec<char> = view.template.chars().collect();
    let position = view.mrna.chars().count();
    let window = visible_window(template.len(), position, inner_width(area));

    let mut dna = vec![label("DNA")];
    let mut marker = vec![label("")];
    let mut mrna = vec![label("mRNA")];
    let transcript: Vec<char> = view.mrna.chars().collect();
    for i in window.clone() {
        let active = !view.complete && i == position;
        dna.push(base_span(template[i], active));
        marker.push(Span::raw(if active { state.glyphs.polymerase } else { " " }));
        mrna.push(match transcript.get(i) {
            Some(&c) => base_span(c, false),
            None => Span::raw(" "),
        });
    }

    let title = format!("Transcription {}/{}", position, template.len());
    let paragraph = Paragraph::new(vec![Line::from(dna), Line::from(marker), Line::from(mrna)])
        .block(panel(title, state, Track::Transcription));
    frame.render_widget(paragraph, area);
}

fn render_translation_panel(frame: &mut Frame, state: &AppState, area: Rect) {
    let view = &state.translation;
    let glyphs = &state.glyphs;
    // Each codon takes 3 columns plus a separator
    let fit = (inner_width(area) / 4).max(1);
    let window = visible_window(view.codons.len(), view.read, fit);

    let mut codons = vec![label("mRNA")];
    let mut marker = vec![label("")];
    for i in window {
        let codon = view.codons[i].to_string();
        let active = !view.complete && i == view.read;
        for c in codon.chars() {
            codons.push(base_span(c, active));
        }
        codons.push(Span::raw(" "));
        marker.push(Span::raw(if active {
            format!(" {}  ", glyphs.ribosome)
        } else {
            "    ".to_string()
        }));
    }

    let table = state.session.table();
    let mut protein = vec![label("Protein")];
    for (i, &aa) in view.residues.iter().enumerate() {
        if i > 0 {
            protein.push(Span::raw(glyphs.bond));
        }
        let codon = view.codons.get(i).copied();
        protein.push(Span::styled(
            aa.abbreviation(),
            Style::default()
                .fg(Color::Black)
                .bg(residue_color(table, aa, codon)),
        ));
    }
    if let Some(stop) = view.stop {
        protein.push(Span::styled(
            format!(" {} {}", glyphs.arrow_right, stop),
            Style::default().fg(category_color(Category::Stop)),
        ));
    }

    let title = format!("Translation {} aa", view.residues.len());
    let paragraph = Paragraph::new(vec![Line::from(codons), Line::from(marker), Line::from(protein)])
        .block(panel(title, state, Track::Translation));
    frame.render_widget(paragraph, area);
}

fn render_reverse_panel(frame: &mut Frame, state: &AppState, area: Rect) {
    let view = &state.reverse;
    let fit = (inner_width(area) / 4).max(1);
    let window = visible_window(view.protein.len(), view.picks.len(), fit);

    let mut protein = vec![label("Protein")];
    let mut codons = vec![label("Codons")];
    let mut dna = vec![label("DNA")];
    let table = state.session.table();
    for i in window {
        let aa = view.protein[i];
        let codon = view.picks.get(i).map(|&(_, codon)| codon);
        protein.push(Span::styled(
            format!(" {}  ", aa.symbol()),
            Style::default().fg(residue_color(table, aa, codon)),
        ));
        match view.picks.get(i) {
            Some((_, codon)) => {
                let text = codon.to_string();
                for c in text.chars() {
                    codons.push(base_span(c, false));
                }
                codons.push(Span::raw(" "));
                let template = crate::reverse_translation::template_strand(&text);
                for c in template.chars() {
                    dna.push(base_span(c, false));
                }
                dna.push(Span::raw(" "));
            }
            None => {
                codons.push(Span::raw("    "));
                dna.push(Span::raw("    "));
            }
        }
    }

    let mut lines = vec![Line::from(protein), Line::from(codons), Line::from(dna)];
    if let Some(summary) = &view.summary {
        lines.push(Line::from(format!(
            "{} {}",
            state.glyphs.h_separator.repeat(LABEL_WIDTH),
            state.glyphs.arrow_down
        )));
        lines.extend(summary.lines().map(|l| Line::from(l.to_string())));
    }

    let title = format!(
        "Reverse translation ({})",
        state.session.config().strategy.description()
    );
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(panel(title, state, Track::ReverseTranslation));
    frame.render_widget(paragraph, area);
}

fn render_log_panel(frame: &mut Frame, state: &AppState, area: Rect) {
    let rows = area.height.saturating_sub(2) as usize;
    let skip = state.log.len().saturating_sub(rows);
    let lines: Vec<Line> = state
        .log
        .iter()
        .skip(skip)
        .map(|l| Line::from(l.as_str()))
        .collect();
    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Events"));
    frame.render_widget(paragraph, area);
}

/// Renders the status bar at the bottom.
fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let (mode_str, command_str) = match &state.mode {
        AppMode::Normal => ("NORMAL", String::new()),
        AppMode::Command(cmd) => ("COMMAND", format!(":{}", cmd)),
    };

    let config = state.session.config();
    let track_info = format!(
        "{} {}ms {} | T:{} L:{} R:{} ",
        config.mode,
        config.speed_ms,
        config.strategy,
        state.track_state(Track::Transcription),
        state.track_state(Track::Translation),
        state.track_state(Track::ReverseTranslation)
    );

    let message = state.status_message.as_deref().unwrap_or("");

    let left_content = if command_str.is_empty() {
        format!(" {} | {} ", mode_str, message)
    } else {
        format!(" {} | {} ", mode_str, command_str)
    };

    let left_len = left_content.chars().count();
    let status_line = Line::from(vec![
        Span::styled(left_content, Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::styled(
            " ".repeat((area.width as usize).saturating_sub(left_len + track_info.len())),
            Style::default().bg(Color::Cyan),
        ),
        Span::styled(
            track_info,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    frame.render_widget(Paragraph::new(status_line), area);
}

const HELP_TEXT: &[&str] = &[
    "s          start animation",
    "space      pause / resume",
    "n          next step (step mode)",
    "r          reset",
    "+ / -      faster / slower",
    ":dna SEQ   load a DNA coding sequence",
    ":protein SEQ  load a protein (one-letter codes, * = stop)",
    ":run       start animation",
    ":speed MS  duration of a whole animation",
    ":mode auto|step",
    ":strategy random|most_common|gc_rich|gc_poor|balanced",
    ":progress  show achievements and points",
    ":quiz PHASE SCORE TOTAL  record a quiz result",
    ":reset-progress  clear achievements and scores",
    ":q         quit",
    "",
    "Press any key to close",
];

fn render_help(frame: &mut Frame, area: Rect) {
    let width = area.width.min(64);
    let height = area.height.min(HELP_TEXT.len() as u16 + 2);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    let lines: Vec<Line> = HELP_TEXT.iter().map(|l| Line::from(*l)).collect();
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL).title("Help"));
    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}

/// Width available for wrapped text in the reverse translation panel.
pub fn calculate_text_width(terminal_width: u16) -> usize {
    terminal_width.saturating_sub(4) as usize
}
