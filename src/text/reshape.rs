//! Contextual glyph reshaping for Arabic-script text.
//!
//! Arabic letters take isolated, final, initial or medial forms depending
//! on whether their neighbours join to them. Fonts used without an OpenType
//! shaper need those forms spelled out as presentation-form code points
//! (U+FB50..U+FDFF, U+FE70..U+FEFF). This stage rewrites logical-order text
//! into presentation forms and folds lam + alef into the mandatory
//! ligatures. It does not reorder anything.

/// The four contextual forms of a letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Forms {
    isolated: char,
    final_: char,
    initial: Option<char>,
    medial: Option<char>,
}

impl Forms {
    fn joins_next(&self) -> bool {
        self.initial.is_some()
    }
}

/// Dual-joining letter whose forms are four consecutive code points.
const fn dual(isolated: u32) -> Forms {
    Forms {
        isolated: to_char(isolated),
        final_: to_char(isolated + 1),
        initial: Some(to_char(isolated + 2)),
        medial: Some(to_char(isolated + 3)),
    }
}

/// Right-joining letter: joins only to the preceding letter.
const fn right(isolated: u32) -> Forms {
    Forms {
        isolated: to_char(isolated),
        final_: to_char(isolated + 1),
        initial: None,
        medial: None,
    }
}

const fn to_char(code: u32) -> char {
    match char::from_u32(code) {
        Some(c) => c,
        None => '\u{FFFD}',
    }
}

const LAM: char = '\u{0644}';
const TATWEEL: char = '\u{0640}';
const ZWJ: char = '\u{200D}';

fn forms(ch: char) -> Option<Forms> {
    let f = match ch {
        '\u{0621}' => Forms {
            isolated: '\u{FE80}',
            final_: '\u{FE80}',
            initial: None,
            medial: None,
        },
        '\u{0622}' => right(0xFE81),
        '\u{0623}' => right(0xFE83),
        '\u{0624}' => right(0xFE85),
        '\u{0625}' => right(0xFE87),
        '\u{0626}' => dual(0xFE89),
        '\u{0627}' => right(0xFE8D),
        '\u{0628}' => dual(0xFE8F),
        '\u{0629}' => right(0xFE93),
        '\u{062A}' => dual(0xFE95),
        '\u{062B}' => dual(0xFE99),
        '\u{062C}' => dual(0xFE9D),
        '\u{062D}' => dual(0xFEA1),
        '\u{062E}' => dual(0xFEA5),
        '\u{062F}' => right(0xFEA9),
        '\u{0630}' => right(0xFEAB),
        '\u{0631}' => right(0xFEAD),
        '\u{0632}' => right(0xFEAF),
        '\u{0633}' => dual(0xFEB1),
        '\u{0634}' => dual(0xFEB5),
        '\u{0635}' => dual(0xFEB9),
        '\u{0636}' => dual(0xFEBD),
        '\u{0637}' => dual(0xFEC1),
        '\u{0638}' => dual(0xFEC5),
        '\u{0639}' => dual(0xFEC9),
        '\u{063A}' => dual(0xFECD),
        '\u{0641}' => dual(0xFED1),
        '\u{0642}' => dual(0xFED5),
        '\u{0643}' => dual(0xFED9),
        '\u{0644}' => dual(0xFEDD),
        '\u{0645}' => dual(0xFEE1),
        '\u{0646}' => dual(0xFEE5),
        '\u{0647}' => dual(0xFEE9),
        '\u{0648}' => right(0xFEED),
        '\u{0649}' => Forms {
            isolated: '\u{FEEF}',
            final_: '\u{FEF0}',
            initial: Some('\u{FBE8}'),
            medial: Some('\u{FBE9}'),
        },
        '\u{064A}' => dual(0xFEF1),
        '\u{0671}' => right(0xFB50),
        '\u{0679}' => dual(0xFB66),
        '\u{067E}' => dual(0xFB56),
        '\u{0686}' => dual(0xFB7A),
        '\u{0688}' => right(0xFB88),
        '\u{0691}' => right(0xFB8C),
        '\u{0698}' => right(0xFB8A),
        '\u{06A9}' => dual(0xFB8E),
        '\u{06AF}' => dual(0xFB92),
        '\u{06BE}' => dual(0xFBAA),
        '\u{06C0}' => right(0xFBA4),
        '\u{06C1}' => dual(0xFBA6),
        '\u{06CC}' => dual(0xFBFC),
        '\u{06D2}' => right(0xFBAE),
        _ => return None,
    };
    Some(f)
}

/// Isolated and final forms of lam followed by an alef variant.
fn lam_alef(alef: char) -> Option<(char, char)> {
    match alef {
        '\u{0622}' => Some(('\u{FEF5}', '\u{FEF6}')),
        '\u{0623}' => Some(('\u{FEF7}', '\u{FEF8}')),
        '\u{0625}' => Some(('\u{FEF9}', '\u{FEFA}')),
        '\u{0627}' => Some(('\u{FEFB}', '\u{FEFC}')),
        _ => None,
    }
}

/// Combining marks that do not affect joining.
fn is_transparent(ch: char) -> bool {
    matches!(ch,
        '\u{0610}'..='\u{061A}'
        | '\u{064B}'..='\u{065F}'
        | '\u{0670}'
        | '\u{06D6}'..='\u{06DC}'
        | '\u{06DF}'..='\u{06E4}'
        | '\u{06E7}'..='\u{06E8}'
        | '\u{06EA}'..='\u{06ED}')
}

/// Can `ch` connect to the letter after it?
fn joins_next(ch: char) -> bool {
    ch == TATWEEL || ch == ZWJ || forms(ch).is_some_and(|f| f.joins_next())
}

/// Can `ch` connect to the letter before it?
fn joins_prev(ch: char) -> bool {
    ch == TATWEEL || ch == ZWJ || forms(ch).is_some_and(|f| f.final_ != f.isolated)
}

/// Check if `text` contains anything this stage would rewrite.
pub fn needs_reshaping(text: &str) -> bool {
    text.chars().any(|c| forms(c).is_some())
}

/// Rewrite Arabic-script letters into contextual presentation forms.
pub fn reshape(text: &str) -> String {
    if !needs_reshaping(text) {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    // Last non-transparent character emitted, after ligature folding.
    let mut prev: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if is_transparent(ch) {
            out.push(ch);
            i += 1;
            continue;
        }

        let Some(f) = forms(ch) else {
            out.push(ch);
            prev = Some(ch);
            i += 1;
            continue;
        };

        let connects_prev = prev.is_some_and(joins_next) && joins_prev(ch);

        if ch == LAM {
            if let Some((isolated, final_)) = chars.get(i + 1).copied().and_then(lam_alef) {
                out.push(if connects_prev { final_ } else { isolated });
                // The ligature ends with an alef, which never joins forward.
                prev = Some(chars[i + 1]);
                i += 2;
                continue;
            }
        }

        let next = chars[i + 1..].iter().copied().find(|c| !is_transparent(*c));
        let connects_next = f.joins_next() && next.is_some_and(joins_prev);

        let shaped = match (connects_prev, connects_next) {
            (true, true) => f.medial.unwrap_or(f.final_),
            (true, false) => f.final_,
            (false, true) => f.initial.unwrap_or(f.isolated),
            (false, false) => f.isolated,
        };
        out.push(shaped);
        prev = Some(ch);
        i += 1;
    }

    out
}
