//! Arabic presentation-form reshaping
//!
//! Engines without a bidi/shaping pass render Arabic text as disconnected
//! isolated letters in logical order. This module rewrites every Arabic
//! script run in a markup string into its contextual presentation forms
//! (Unicode Arabic Presentation Forms-B) in visual order, so the engine can
//! lay the run out as plain left-to-right glyphs.
//!
//! The pass is symmetric identify-then-replace: all run boundaries are
//! collected first as byte-offset pairs, then replaced from the highest
//! offset down. Replacements change the byte length of the string (base
//! letters are 2 bytes, presentation forms are 3), so processing forward
//! would invalidate every offset after the first replacement.

use unicode_script::{Script, UnicodeScript};

const LAM: char = '\u{0644}';

/// Reshape every Arabic run in `input`, leaving everything else untouched
pub fn reshape(input: &str) -> String {
    let runs = find_runs(input);
    if runs.is_empty() {
        return input.to_string();
    }

    let mut out = input.to_string();
    // Highest offset first: earlier run offsets stay valid while
    // replacements change the byte length.
    for &(start, end) in runs.iter().rev() {
        let shaped = shape_run(&input[start..end]);
        out.replace_range(start..end, &shaped);
    }
    out
}

/// Locate maximal Arabic script runs as byte-offset pairs, in document order
///
/// A run starts on an Arabic-script character and extends over Arabic-script
/// and join-transparent (combining mark) characters. Tags and attributes are
/// scanned like any other text.
pub fn find_runs(input: &str) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut current: Option<usize> = None;

    for (idx, c) in input.char_indices() {
        let arabic = c.script() == Script::Arabic;
        let extends = arabic || (current.is_some() && is_transparent(c));

        match (current, extends, arabic) {
            (None, _, true) => current = Some(idx),
            (Some(start), false, _) => {
                runs.push((start, idx));
                current = None;
            }
            _ => {}
        }
    }
    if let Some(start) = current {
        runs.push((start, input.len()));
    }
    runs
}

/// Shape one run into visually-ordered presentation forms
fn shape_run(run: &str) -> String {
    let chars: Vec<char> = run.chars().collect();
    let mut shaped: Vec<char> = Vec::with_capacity(chars.len());

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if is_transparent(c) {
            shaped.push(c);
            i += 1;
            continue;
        }

        let prev_joins =
            joins_backward(c) && previous_letter(&chars, i).map_or(false, |p| joins_forward(chars[p]));

        // Lam-alef pairs collapse into a single ligature glyph.
        if c == LAM {
            if let Some(j) = next_letter(&chars, i) {
                if let Some((isolated, final_)) = lam_alef_ligature(chars[j]) {
                    shaped.push(if prev_joins { final_ } else { isolated });
                    // Marks between the pair stay attached to the ligature.
                    shaped.extend(&chars[i + 1..j]);
                    i = j + 1;
                    continue;
                }
            }
        }

        match forms(c) {
            Some(f) => {
                let next_joins = joins_forward(c)
                    && next_letter(&chars, i).map_or(false, |j| joins_backward(chars[j]));
                let glyph = match (prev_joins, next_joins) {
                    (false, false) => f.isolated,
                    (true, false) => f.final_,
                    (false, true) => f.initial.unwrap_or(f.isolated),
                    (true, true) => f.medial.unwrap_or(f.final_),
                };
                shaped.push(glyph);
            }
            // Digits, punctuation, and letters outside the table keep
            // their original code point.
            None => shaped.push(c),
        }
        i += 1;
    }

    reorder_visual(&shaped)
}

/// Reverse a shaped run into visual order
///
/// Combining marks stay attached to their base and digit sequences keep
/// their logical order, so only base groups are reversed.
fn reorder_visual(shaped: &[char]) -> String {
    let mut groups: Vec<Vec<char>> = Vec::new();

    for &c in shaped {
        match groups.last_mut() {
            Some(group)
                if is_transparent(c)
                    || (is_arabic_digit(c) && group.iter().all(|&x| is_arabic_digit(x))) =>
            {
                group.push(c);
            }
            _ => groups.push(vec![c]),
        }
    }

    groups.iter().rev().flatten().collect()
}

fn is_arabic_digit(c: char) -> bool {
    matches!(c, '\u{0660}'..='\u{0669}' | '\u{06F0}'..='\u{06F9}')
}

/// Join-transparent characters (harakat and other combining marks)
fn is_transparent(c: char) -> bool {
    matches!(
        c,
        '\u{0610}'..='\u{061A}'
            | '\u{064B}'..='\u{065F}'
            | '\u{0670}'
            | '\u{06D6}'..='\u{06DC}'
            | '\u{06DF}'..='\u{06E4}'
            | '\u{06E7}'
            | '\u{06E8}'
            | '\u{06EA}'..='\u{06ED}'
    )
}

/// Whether `c` can connect to the preceding letter
fn joins_backward(c: char) -> bool {
    matches!(joining(c), Joining::Dual | Joining::Right)
}

/// Whether `c` can connect to the following letter
fn joins_forward(c: char) -> bool {
    matches!(joining(c), Joining::Dual)
}

fn previous_letter(chars: &[char], i: usize) -> Option<usize> {
    chars[..i].iter().rposition(|&c| !is_transparent(c))
}

fn next_letter(chars: &[char], i: usize) -> Option<usize> {
    chars[i + 1..]
        .iter()
        .position(|&c| !is_transparent(c))
        .map(|off| i + 1 + off)
}

#[derive(Clone, Copy, PartialEq)]
enum Joining {
    /// Connects on both sides (most letters)
    Dual,
    /// Connects to the preceding letter only (alef, dal, reh, waw, ...)
    Right,
    /// Never connects (hamza, digits, punctuation)
    None,
}

fn joining(c: char) -> Joining {
    match c {
        '\u{0626}'
        | '\u{0628}'
        | '\u{062A}'..='\u{062E}'
        | '\u{0633}'..='\u{063A}'
        | '\u{0640}'
        | '\u{0641}'..='\u{0647}'
        | '\u{064A}' => Joining::Dual,
        '\u{0622}'..='\u{0625}'
        | '\u{0627}'
        | '\u{0629}'
        | '\u{062F}'..='\u{0632}'
        | '\u{0648}'
        | '\u{0649}' => Joining::Right,
        _ => Joining::None,
    }
}

struct Forms {
    isolated: char,
    final_: char,
    initial: Option<char>,
    medial: Option<char>,
}

impl Forms {
    const fn dual(isolated: char, final_: char, initial: char, medial: char) -> Self {
        Self {
            isolated,
            final_,
            initial: Some(initial),
            medial: Some(medial),
        }
    }

    const fn right(isolated: char, final_: char) -> Self {
        Self {
            isolated,
            final_,
            initial: None,
            medial: None,
        }
    }
}

/// Presentation Forms-B glyphs for each base letter
fn forms(c: char) -> Option<Forms> {
    let f = match c {
        '\u{0621}' => Forms::right('\u{FE80}', '\u{FE80}'), // hamza, never joins
        '\u{0622}' => Forms::right('\u{FE81}', '\u{FE82}'), // alef madda
        '\u{0623}' => Forms::right('\u{FE83}', '\u{FE84}'), // alef hamza above
        '\u{0624}' => Forms::right('\u{FE85}', '\u{FE86}'), // waw hamza
        '\u{0625}' => Forms::right('\u{FE87}', '\u{FE88}'), // alef hamza below
        '\u{0626}' => Forms::dual('\u{FE89}', '\u{FE8A}', '\u{FE8B}', '\u{FE8C}'), // yeh hamza
        '\u{0627}' => Forms::right('\u{FE8D}', '\u{FE8E}'), // alef
        '\u{0628}' => Forms::dual('\u{FE8F}', '\u{FE90}', '\u{FE91}', '\u{FE92}'), // beh
        '\u{0629}' => Forms::right('\u{FE93}', '\u{FE94}'), // teh marbuta
        '\u{062A}' => Forms::dual('\u{FE95}', '\u{FE96}', '\u{FE97}', '\u{FE98}'), // teh
        '\u{062B}' => Forms::dual('\u{FE99}', '\u{FE9A}', '\u{FE9B}', '\u{FE9C}'), // theh
        '\u{062C}' => Forms::dual('\u{FE9D}', '\u{FE9E}', '\u{FE9F}', '\u{FEA0}'), // jeem
        '\u{062D}' => Forms::dual('\u{FEA1}', '\u{FEA2}', '\u{FEA3}', '\u{FEA4}'), // hah
        '\u{062E}' => Forms::dual('\u{FEA5}', '\u{FEA6}', '\u{FEA7}', '\u{FEA8}'), // khah
        '\u{062F}' => Forms::right('\u{FEA9}', '\u{FEAA}'), // dal
        '\u{0630}' => Forms::right('\u{FEAB}', '\u{FEAC}'), // thal
        '\u{0631}' => Forms::right('\u{FEAD}', '\u{FEAE}'), // reh
        '\u{0632}' => Forms::right('\u{FEAF}', '\u{FEB0}'), // zain
        '\u{0633}' => Forms::dual('\u{FEB1}', '\u{FEB2}', '\u{FEB3}', '\u{FEB4}'), // seen
        '\u{0634}' => Forms::dual('\u{FEB5}', '\u{FEB6}', '\u{FEB7}', '\u{FEB8}'), // sheen
        '\u{0635}' => Forms::dual('\u{FEB9}', '\u{FEBA}', '\u{FEBB}', '\u{FEBC}'), // sad
        '\u{0636}' => Forms::dual('\u{FEBD}', '\u{FEBE}', '\u{FEBF}', '\u{FEC0}'), // dad
        '\u{0637}' => Forms::dual('\u{FEC1}', '\u{FEC2}', '\u{FEC3}', '\u{FEC4}'), // tah
        '\u{0638}' => Forms::dual('\u{FEC5}', '\u{FEC6}', '\u{FEC7}', '\u{FEC8}'), // zah
        '\u{0639}' => Forms::dual('\u{FEC9}', '\u{FECA}', '\u{FECB}', '\u{FECC}'), // ain
        '\u{063A}' => Forms::dual('\u{FECD}', '\u{FECE}', '\u{FECF}', '\u{FED0}'), // ghain
        '\u{0641}' => Forms::dual('\u{FED1}', '\u{FED2}', '\u{FED3}', '\u{FED4}'), // feh
        '\u{0642}' => Forms::dual('\u{FED5}', '\u{FED6}', '\u{FED7}', '\u{FED8}'), // qaf
        '\u{0643}' => Forms::dual('\u{FED9}', '\u{FEDA}', '\u{FEDB}', '\u{FEDC}'), // kaf
        '\u{0644}' => Forms::dual('\u{FEDD}', '\u{FEDE}', '\u{FEDF}', '\u{FEE0}'), // lam
        '\u{0645}' => Forms::dual('\u{FEE1}', '\u{FEE2}', '\u{FEE3}', '\u{FEE4}'), // meem
        '\u{0646}' => Forms::dual('\u{FEE5}', '\u{FEE6}', '\u{FEE7}', '\u{FEE8}'), // noon
        '\u{0647}' => Forms::dual('\u{FEE9}', '\u{FEEA}', '\u{FEEB}', '\u{FEEC}'), // heh
        '\u{0648}' => Forms::right('\u{FEED}', '\u{FEEE}'), // waw
        '\u{0649}' => Forms::right('\u{FEEF}', '\u{FEF0}'), // alef maksura
        '\u{064A}' => Forms::dual('\u{FEF1}', '\u{FEF2}', '\u{FEF3}', '\u{FEF4}'), // yeh
        _ => return None,
    };
    Some(f)
}

/// (isolated, final) ligature pair for lam followed by an alef variant
fn lam_alef_ligature(alef: char) -> Option<(char, char)> {
    match alef {
        '\u{0622}' => Some(('\u{FEF5}', '\u{FEF6}')),
        '\u{0623}' => Some(('\u{FEF7}', '\u{FEF8}')),
        '\u{0625}' => Some(('\u{FEF9}', '\u{FEFA}')),
        '\u{0627}' => Some(('\u{FEFB}', '\u{FEFC}')),
        _ => None,
    }
}
