use std::io::{self, Write};

/// Destination for the two output channels of a validation run.
pub trait OutputSink {
    /// Line-oriented status messages (loading, which checks run, fatal errors).
    fn write_progress(&mut self, line: &str) -> io::Result<()>;

    /// The rendered report.
    fn write_report(&mut self, text: &str) -> io::Result<()>;
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn write_progress(&mut self, line: &str) -> io::Result<()> {
        (**self).write_progress(line)
    }

    fn write_report(&mut self, text: &str) -> io::Result<()> {
        (**self).write_report(text)
    }
}

/// Captures both channels in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub progress: Vec<String>,
    pub report: String,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for MemorySink {
    fn write_progress(&mut self, line: &str) -> io::Result<()> {
        self.progress.push(line.to_string());
        Ok(())
    }

    fn write_report(&mut self, text: &str) -> io::Result<()> {
        self.report.push_str(text);
        Ok(())
    }
}

/// Progress lines to one writer, the report to another.
pub struct WriterSink<P, R> {
    progress: P,
    report: R,
}

impl<P: Write, R: Write> WriterSink<P, R> {
    pub fn new(progress: P, report: R) -> Self {
        Self { progress, report }
    }
}

impl WriterSink<io::Stderr, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stderr(), io::stdout())
    }
}

impl<P: Write, R: Write> OutputSink for WriterSink<P, R> {
    fn write_progress(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.progress, "{}", line)
    }

    fn write_report(&mut self, text: &str) -> io::Result<()> {
        self.report.write_all(text.as_bytes())?;
        self.report.flush()
    }
}

/// Applies the run's silent flag in front of a sink.
pub struct Channels<'a> {
    sink: &'a mut dyn OutputSink,
    silent: bool,
}

impl<'a> Channels<'a> {
    pub fn new(sink: &'a mut dyn OutputSink, silent: bool) -> Self {
        Self { sink, silent }
    }

    /// Write failures on the progress channel are logged and ignored.
    pub fn progress(&mut self, line: &str) {
        if self.silent {
            return;
        }
        if let Err(err) = self.sink.write_progress(line) {
            tracing::debug!("dropping progress line: {}", err);
        }
    }

    pub fn report(&mut self, text: &str) -> io::Result<()> {
        if self.silent {
            return Ok(());
        }
        self.sink.write_report(text)
    }
}
