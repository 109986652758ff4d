use nu_ansi_term::Color::{Cyan, Red, Yellow};
use std::io::{self, Write};

/// Print info on console.
pub fn info(message: &str) {
    println!("{}", Cyan.bold().italic().paint(message));
}

/// Print warning on the error console.
pub fn warn(message: &str, data: &str) {
    eprintln!(
        "{} \n {} ",
        Yellow.bold().italic().paint(message),
        Red.bold().italic().paint(data)
    );
}

/// Print an error on the error console, followed by the hint for the operator if there is one.
pub fn error(message: &str, hint: Option<&str>) {
    // Nothing left to report to if stderr is gone.
    let _ = write_error(&mut io::stderr().lock(), message, hint);
}

/// Write an error and its hint. The hint is written verbatim, without colours.
pub fn write_error<W: Write>(out: &mut W, message: &str, hint: Option<&str>) -> io::Result<()> {
    writeln!(out, "{}", Red.bold().paint(message))?;
    if let Some(hint) = hint {
        write!(out, "{hint}")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::write_error;

    #[test]
    fn test_write_error() {
        let mut out = Vec::new();
        write_error(&mut out, "Failed", Some("\n    $ helmet config --help\n")).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Failed"));
        assert!(out.ends_with("\n    $ helmet config --help\n"));

        let mut out = Vec::new();
        write_error(&mut out, "Failed", None).unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with('\n'));
    }
}
