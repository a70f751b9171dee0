//! Built-in layouts: Spanish ISO ("ES") and US ANSI ("US").
//!
//! Every row totals 15 width units.  Icon tokens are Segoe MDL2 private-use
//! code points rendered by the view layer: `\u{E756}` (backspace) and
//! `\u{E770}` (Windows logo).

use crate::domain::layout::{KeyDescriptor, KeyRow, Layout};
use crate::keymap::PhysicalKey::*;

/// Backspace icon token.
pub const ICON_BACKSPACE: &str = "\u{E756}";
/// Windows-logo icon token.
pub const ICON_WINDOWS: &str = "\u{E770}";

fn letters(keys: &[(crate::keymap::PhysicalKey, &str)]) -> Vec<KeyDescriptor> {
    keys.iter()
        .map(|&(key, text)| KeyDescriptor::letter(key, text))
        .collect()
}

fn bottom_row(alt_right_label: &str) -> KeyRow {
    KeyRow::new(vec![
        KeyDescriptor::key(ControlLeft, "Ctrl").width(1.25),
        KeyDescriptor::key(MetaLeft, ICON_WINDOWS).width(1.25),
        KeyDescriptor::key(AltLeft, "Alt").width(1.25),
        KeyDescriptor::key(Space, "Space").width(6.25),
        KeyDescriptor::key(AltRight, alt_right_label).width(1.25),
        KeyDescriptor::key(MetaRight, ICON_WINDOWS).width(1.25),
        KeyDescriptor::key(ContextMenu, "Menu").width(1.25),
        KeyDescriptor::key(ControlRight, "Ctrl").width(1.25),
    ])
}

/// Spanish (Spain) ISO layout.
pub fn spanish() -> Layout {
    let number_row = KeyRow::new(vec![
        KeyDescriptor::shifted(Backquote, "º", "ª"),
        KeyDescriptor::shifted(Digit1, "1", "!"),
        KeyDescriptor::shifted(Digit2, "2", "\""),
        KeyDescriptor::shifted(Digit3, "3", "·"),
        KeyDescriptor::shifted(Digit4, "4", "$"),
        KeyDescriptor::shifted(Digit5, "5", "%"),
        KeyDescriptor::shifted(Digit6, "6", "&"),
        KeyDescriptor::shifted(Digit7, "7", "/"),
        KeyDescriptor::shifted(Digit8, "8", "("),
        KeyDescriptor::shifted(Digit9, "9", ")"),
        KeyDescriptor::shifted(Digit0, "0", "="),
        KeyDescriptor::shifted(Minus, "'", "?"),
        KeyDescriptor::shifted(Equal, "¡", "¿"),
        KeyDescriptor::key(Backspace, ICON_BACKSPACE).width(2.0),
    ]);

    let mut top_row = vec![KeyDescriptor::key(Tab, "Tab").width(1.5)];
    top_row.extend(letters(&[
        (KeyQ, "q"), (KeyW, "w"), (KeyE, "e"), (KeyR, "r"), (KeyT, "t"),
        (KeyY, "y"), (KeyU, "u"), (KeyI, "i"), (KeyO, "o"), (KeyP, "p"),
    ]));
    top_row.extend([
        KeyDescriptor::shifted(BracketLeft, "`", "^"),
        KeyDescriptor::shifted(BracketRight, "+", "*"),
        KeyDescriptor::key(Enter, "Enter").width(1.5),
    ]);

    let mut home_row = vec![KeyDescriptor::key(CapsLock, "Bloq\nMayus").width(1.75)];
    home_row.extend(letters(&[
        (KeyA, "a"), (KeyS, "s"), (KeyD, "d"), (KeyF, "f"), (KeyG, "g"),
        (KeyH, "h"), (KeyJ, "j"), (KeyK, "k"), (KeyL, "l"), (Semicolon, "ñ"),
    ]));
    home_row.extend([
        KeyDescriptor::shifted(Quote, "´", "¨"),
        KeyDescriptor::shifted(Backslash, "ç", "Ç"),
        KeyDescriptor::key(Enter, "Enter").width(1.25),
    ]);

    let mut bottom_letters = vec![
        KeyDescriptor::key(ShiftLeft, "Shift").width(1.25),
        KeyDescriptor::shifted(IntlBackslash, "<", ">"),
    ];
    bottom_letters.extend(letters(&[
        (KeyZ, "z"), (KeyX, "x"), (KeyC, "c"), (KeyV, "v"),
        (KeyB, "b"), (KeyN, "n"), (KeyM, "m"),
    ]));
    bottom_letters.extend([
        KeyDescriptor::shifted(Comma, ",", ";"),
        KeyDescriptor::shifted(Period, ".", ":"),
        KeyDescriptor::shifted(Slash, "-", "_"),
        KeyDescriptor::key(ShiftRight, "Shift").width(2.75),
    ]);

    Layout::new(
        "ES",
        vec![
            number_row,
            KeyRow::new(top_row),
            KeyRow::new(home_row),
            KeyRow::new(bottom_letters),
            bottom_row("Alt Gr"),
        ],
    )
}

/// United States ANSI layout.
pub fn us() -> Layout {
    let number_row = KeyRow::new(vec![
        KeyDescriptor::shifted(Backquote, "`", "~"),
        KeyDescriptor::shifted(Digit1, "1", "!"),
        KeyDescriptor::shifted(Digit2, "2", "@"),
        KeyDescriptor::shifted(Digit3, "3", "#"),
        KeyDescriptor::shifted(Digit4, "4", "$"),
        KeyDescriptor::shifted(Digit5, "5", "%"),
        KeyDescriptor::shifted(Digit6, "6", "^"),
        KeyDescriptor::shifted(Digit7, "7", "&"),
        KeyDescriptor::shifted(Digit8, "8", "*"),
        KeyDescriptor::shifted(Digit9, "9", "("),
        KeyDescriptor::shifted(Digit0, "0", ")"),
        KeyDescriptor::shifted(Minus, "-", "_"),
        KeyDescriptor::shifted(Equal, "=", "+"),
        KeyDescriptor::key(Backspace, ICON_BACKSPACE).width(2.0),
    ]);

    let mut top_row = vec![KeyDescriptor::key(Tab, "Tab").width(1.5)];
    top_row.extend(letters(&[
        (KeyQ, "q"), (KeyW, "w"), (KeyE, "e"), (KeyR, "r"), (KeyT, "t"),
        (KeyY, "y"), (KeyU, "u"), (KeyI, "i"), (KeyO, "o"), (KeyP, "p"),
    ]));
    top_row.extend([
        KeyDescriptor::shifted(BracketLeft, "[", "{"),
        KeyDescriptor::shifted(BracketRight, "]", "}"),
        KeyDescriptor::shifted(Backslash, "\\", "|").width(1.5),
    ]);

    let mut home_row = vec![KeyDescriptor::key(CapsLock, "Caps\nLock").width(1.75)];
    home_row.extend(letters(&[
        (KeyA, "a"), (KeyS, "s"), (KeyD, "d"), (KeyF, "f"), (KeyG, "g"),
        (KeyH, "h"), (KeyJ, "j"), (KeyK, "k"), (KeyL, "l"),
    ]));
    home_row.extend([
        KeyDescriptor::shifted(Semicolon, ";", ":"),
        KeyDescriptor::shifted(Quote, "'", "\""),
        KeyDescriptor::key(Enter, "Enter").width(2.25),
    ]);

    let mut bottom_letters = vec![KeyDescriptor::key(ShiftLeft, "Shift").width(2.25)];
    bottom_letters.extend(letters(&[
        (KeyZ, "z"), (KeyX, "x"), (KeyC, "c"), (KeyV, "v"),
        (KeyB, "b"), (KeyN, "n"), (KeyM, "m"),
    ]));
    bottom_letters.extend([
        KeyDescriptor::shifted(Comma, ",", "<"),
        KeyDescriptor::shifted(Period, ".", ">"),
        KeyDescriptor::shifted(Slash, "/", "?"),
        KeyDescriptor::key(ShiftRight, "Shift").width(2.75),
    ]);

    Layout::new(
        "US",
        vec![
            number_row,
            KeyRow::new(top_row),
            KeyRow::new(home_row),
            KeyRow::new(bottom_letters),
            bottom_row("Alt"),
        ],
    )
}
