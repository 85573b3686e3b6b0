use honggfuzz::fuzz;

use ur_registry::bytewords::{decode, Style};

fn main() {
    loop {
        fuzz!(|data: &str| {
            for style in [Style::Minimal, Style::Standard, Style::Uri] {
                decode(data, style).ok();
            }
        });
    }
}
