//! # Reference Backends
//!
//! Encoders registered in the built-in [`Registry`]. Each wraps a
//! third-party symbology crate behind one of the two backend contracts.
//!
//! | Symbology | Backend | Contract |
//! |-----------|---------|----------|
//! | Code 128, Code 128B | [`linear::Code128`] | flat |
//! | Code 39, LOGMARS | [`linear::Code39`] | flat |
//! | Code 93, Codabar, Code 11 | [`linear`] | flat |
//! | Standard / Interleaved 2 of 5 | [`linear::TwoOfFive`] | flat |
//! | EAN-13/8, UPC-A (+ add-ons) | [`linear::Ean`] | flat |
//! | QR Code | [`qr::Qr`] | segments |
//! | Micro QR | [`qr::MicroQr`] | flat |
//! | PDF417 | [`pdf417::Pdf417`] | segments |
//!
//! HIBC variants reuse the backend of the symbology they wrap. Everything
//! else has capability data but no built-in encoder; plug one in with
//! [`Registry::register`].

pub mod linear;
pub mod pdf417;
pub mod qr;

use crate::dispatch::Registry;
use crate::symbology::Symbology;

/// Register every built-in backend.
pub fn register_builtin(registry: &mut Registry) {
    use Symbology::*;

    registry
        .register_flat(Code128, linear::Code128 { force_b: false })
        .register_flat(Code128B, linear::Code128 { force_b: true })
        .register_flat(Code39, linear::Code39 { logmars: false })
        .register_flat(Logmars, linear::Code39 { logmars: true })
        .register_flat(Code93, linear::Code93)
        .register_flat(Codabar, linear::Codabar)
        .register_flat(Code11, linear::Code11)
        .register_flat(C25Standard, linear::TwoOfFive { interleaved: false })
        .register_flat(C25Inter, linear::TwoOfFive { interleaved: true });

    for s in [Eanx, EanxChk, Upca, UpcaChk] {
        registry.register_flat(s, linear::Ean);
    }

    registry
        .register_segments(QrCode, qr::Qr)
        .register_flat(MicroQr, qr::MicroQr)
        .register_segments(Pdf417, pdf417::Pdf417);
}
