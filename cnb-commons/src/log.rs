use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Writes build output as plain lines indented by nesting level.
///
/// ```
/// use cnb_commons::log::Logger;
///
/// let mut logger = Logger::new(Vec::new());
/// logger.title("Yarn Buildpack 1.0.0");
/// logger.process("Executing build process");
/// logger.subprocess("Installing Yarn 1.22.19");
/// logger.action("Completed in 1.5s");
/// logger.break_line();
///
/// assert_eq!(
///     String::from_utf8(logger.into_inner()).unwrap(),
///     "Yarn Buildpack 1.0.0\n  Executing build process\n    Installing Yarn 1.22.19\n      Completed in 1.5s\n\n"
/// );
/// ```
#[derive(Debug)]
pub struct Logger<W: Write> {
    io: W,
}

impl<W: Write> Logger<W> {
    pub fn new(io: W) -> Self {
        Self { io }
    }

    pub fn title(&mut self, message: impl AsRef<str>) {
        self.write_indented(0, message.as_ref());
    }

    pub fn process(&mut self, message: impl AsRef<str>) {
        self.write_indented(1, message.as_ref());
    }

    pub fn subprocess(&mut self, message: impl AsRef<str>) {
        self.write_indented(2, message.as_ref());
    }

    pub fn action(&mut self, message: impl AsRef<str>) {
        self.write_indented(3, message.as_ref());
    }

    pub fn break_line(&mut self) {
        writeln_now(&mut self.io, "");
    }

    pub fn into_inner(self) -> W {
        self.io
    }

    fn write_indented(&mut self, level: usize, message: &str) {
        let prefix = "  ".repeat(level);
        let contents = prefix_lines(message, |_, line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                prefix.clone()
            }
        });

        writeln_now(&mut self.io, contents.trim_end_matches('\n'));
    }
}

fn prefix_lines<F: Fn(usize, &str) -> String>(contents: &str, f: F) -> String {
    use std::fmt::Write;

    if contents.is_empty() {
        f(0, "")
    } else {
        contents.split_inclusive('\n').enumerate().fold(
            String::new(),
            |mut acc, (line_index, line)| {
                let prefix = f(line_index, line);
                let _ = write!(acc, "{prefix}{line}");
                acc
            },
        )
    }
}

fn writeln_now<D: Write>(destination: &mut D, msg: impl AsRef<str>) {
    writeln!(destination, "{}", msg.as_ref()).expect("Logging error: UI writer closed");

    destination
        .flush()
        .expect("Logging error: UI writer closed");
}

/// # Panics
///
/// Will panic if there was a problem setting the color settings, or all bytes could
/// not be written due to either I/O errors or EOF being reached.
pub fn log_error(header: impl AsRef<str>, body: impl AsRef<str>) {
    let mut stream = StandardStream::stderr(ColorChoice::Always);
    write_styled_message(
        &mut stream,
        format!("\n[Error: {}]", header.as_ref()),
        ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true),
    )
    .expect("Logging error: stderr closed");

    write_styled_message(&mut stream, body, ColorSpec::new().set_fg(Some(Color::Red)))
        .expect("Logging error: stderr closed");
    stream.flush().expect("Logging error: stderr closed");
}

// Styles each line of text separately, so that when buildpack output is streamed to the
// user (and prefixes like `remote:` added) the line colour doesn't leak into the prefixes.
fn write_styled_message<S: WriteColor>(
    stream: &mut S,
    message: impl AsRef<str>,
    spec: &ColorSpec,
) -> io::Result<()> {
    // Using `.split('\n')` rather than `.lines()` since the latter eats trailing newlines in
    // the passed message.
    for line in message.as_ref().split('\n') {
        stream.set_color(spec)?;
        write!(stream, "{line}")?;
        stream.reset()?;
        writeln!(stream)?;
    }
    Ok(())
}
