//! Character classification helpers shared by the scanning routines.

pub fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

pub fn is_octal_digit(c: char) -> bool {
    matches!(c, '0'..='7')
}

pub fn is_hex_digit(c: char) -> bool {
    c.is_ascii_hexdigit()
}

pub fn is_ident_start(c: char) -> bool {
    c == '_' || is_letter(c)
}

pub fn is_ident_continue(c: char) -> bool {
    c == '_' || is_letter(c) || is_digit(c)
}

pub fn is_printable_ascii(c: char) -> bool {
    (' '..='~').contains(&c)
}
