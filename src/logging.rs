use std::fmt::Display;

pub fn info(stage: &str, message: impl Display) {
    eprintln!("LOTTO_INFO stage={stage} {message}");
}
