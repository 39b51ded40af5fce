use std::io::BufRead;

/// Read one line and treat it as a yes/no answer.
///
/// Anything starting with `y` or `Y` (after trimming spaces) is a yes. EOF,
/// read errors and everything else are a no.
pub fn ask_yes_or_no(input: &mut dyn BufRead) -> bool {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(_) => line.trim().to_ascii_uppercase().starts_with('Y'),
        Err(_) => false,
    }
}
