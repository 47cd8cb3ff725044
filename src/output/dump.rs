//! Hex dump of the module grid.
//!
//! Four modules per hex digit, most significant first, a space after every
//! second digit and one line per row. A trailing partial nibble is padded
//! with unset modules on the right.

use crate::symbol::Symbol;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Dump every row of the grid.
pub fn dump(symbol: &Symbol) -> Vec<u8> {
    let grid = symbol.grid();
    let width = symbol.width();
    let mut out = Vec::with_capacity(grid.rows() * (width / 4 + width / 8 + 2));

    for r in 0..grid.rows() {
        let mut byt = 0usize;
        let mut digits = 0;
        for i in 0..width {
            byt <<= 1;
            if grid.is_set(r, i) {
                byt += 1;
            }
            if (i + 1) % 4 == 0 {
                out.push(HEX[byt]);
                digits += 1;
                byt = 0;
            }
            if digits == 2 && i + 1 < width {
                out.push(b' ');
                digits = 0;
            }
        }
        if width % 4 != 0 {
            byt <<= 4 - width % 4;
            out.push(HEX[byt]);
        }
        out.push(b'\n');
    }
    out
}
