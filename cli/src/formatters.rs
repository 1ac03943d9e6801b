use std::io::{self, IsTerminal, Write};

use memo_core::{Memo, MemoStats};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::args::OutputFormat;

pub struct MemoFormatter<W: WriteColor> {
    output: OutputFormat,
    out: W,
}

impl MemoFormatter<StandardStream> {
    pub fn stdout(output: OutputFormat) -> Self {
        let choice = if io::stdout().is_terminal() {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        MemoFormatter::new(output, StandardStream::stdout(choice))
    }
}

impl<W: WriteColor> MemoFormatter<W> {
    pub fn new(output: OutputFormat, out: W) -> Self {
        MemoFormatter { output, out }
    }

    pub fn print_memos(&mut self, memos: &[Memo]) -> io::Result<()> {
        match self.output {
            OutputFormat::Json => self.print_json(memos),
            OutputFormat::Plain => {
                for memo in memos {
                    self.print_plain_line(memo)?;
                }
                Ok(())
            }
            OutputFormat::Pretty => {
                if memos.is_empty() {
                    return writeln!(self.out, "No memos found");
                }
                for (i, memo) in memos.iter().enumerate() {
                    if i > 0 {
                        writeln!(self.out)?;
                    }
                    self.print_pretty(memo)?;
                }
                Ok(())
            }
        }
    }

    pub fn print_memo(&mut self, memo: &Memo) -> io::Result<()> {
        match self.output {
            OutputFormat::Json => self.print_json(memo),
            OutputFormat::Plain => {
                self.print_plain_line(memo)?;
                writeln!(self.out, "{}", memo.content)
            }
            OutputFormat::Pretty => self.print_pretty(memo),
        }
    }

    pub fn print_stats(&mut self, stats: &MemoStats) -> io::Result<()> {
        match self.output {
            OutputFormat::Json => self.print_json(stats),
            OutputFormat::Plain => {
                writeln!(self.out, "total\t{}", stats.total)?;
                for (category, count) in &stats.by_category {
                    writeln!(self.out, "{}\t{}", category, count)?;
                }
                Ok(())
            }
            OutputFormat::Pretty => {
                self.out.set_color(ColorSpec::new().set_bold(true))?;
                writeln!(self.out, "{} memos", stats.total)?;
                self.out.reset()?;

                let width = stats
                    .by_category
                    .keys()
                    .map(|k| k.chars().count())
                    .max()
                    .unwrap_or(0);
                for (category, count) in &stats.by_category {
                    writeln!(self.out, "  {:<width$}  {}", category, count, width = width)?;
                }
                Ok(())
            }
        }
    }

    fn print_json<T: serde::Serialize + ?Sized>(&mut self, value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        writeln!(self.out, "{}", json)
    }

    fn print_plain_line(&mut self, memo: &Memo) -> io::Result<()> {
        writeln!(
            self.out,
            "{}\t{}\t{}\t{}\t{}",
            memo.id,
            memo.created_at.format("%Y-%m-%d %H:%M"),
            memo.category,
            memo.tags.join(","),
            memo.title
        )
    }

    fn print_pretty(&mut self, memo: &Memo) -> io::Result<()> {
        self.out
            .set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(self.out, "{}", memo.id)?;
        self.out.reset()?;

        self.out.set_color(ColorSpec::new().set_bold(true))?;
        write!(self.out, "  {}", memo.title)?;
        self.out.reset()?;

        self.out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(self.out, "  [{}]", memo.category)?;
        self.out.reset()?;

        if !memo.tags.is_empty() {
            self.out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            let tags: Vec<String> = memo.tags.iter().map(|t| format!("#{}", t)).collect();
            write!(self.out, "  {}", tags.join(" "))?;
            self.out.reset()?;
        }
        writeln!(self.out)?;

        self.out
            .set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(
            self.out,
            "created {}  updated {}",
            memo.created_at.format("%Y-%m-%d %H:%M"),
            memo.updated_at.format("%Y-%m-%d %H:%M")
        )?;
        self.out.reset()?;

        if !memo.content.is_empty() {
            writeln!(self.out, "{}", memo.content)?;
        }
        Ok(())
    }
}
