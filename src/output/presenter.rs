use std::io::{self, Write};
use serde_json::Value;

use super::config::{OutputConfig, OutputFormat};
use super::types::Envelope;

pub trait Presenter: Send + Sync {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()>;
}

pub struct JsonPresenter { pub pretty: bool }
impl Presenter for JsonPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        if self.pretty { serde_json::to_writer_pretty(&mut *w, env).map_err(to_io)? } else { serde_json::to_writer(&mut *w, env).map_err(to_io)? }
        writeln!(w)
    }
}

/// Prints the payload's `text` field verbatim (the report, or a not-found line);
/// payloads without one fall back to a header plus optional pretty JSON.
pub struct TextPresenter { pub pretty: bool }
impl Presenter for TextPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        let payload = if env.apply { env.result.as_ref() } else { env.plan.as_ref() };
        if let Some(text) = payload.and_then(|p| p.get("text")).and_then(Value::as_str) {
            return writeln!(w, "{}", text);
        }
        if env.apply { writeln!(w, "Result: {}", env.op)?; } else { writeln!(w, "Plan: {}", env.op)?; }
        if self.pretty {
            if let Some(p) = payload { serde_json::to_writer_pretty(&mut *w, p).map_err(to_io)?; writeln!(w)?; }
        }
        Ok(())
    }
}

pub struct Emitter {
    presenter: Box<dyn Presenter>,
}

impl Emitter {
    pub fn new(cfg: OutputConfig) -> Self {
        let presenter: Box<dyn Presenter> = match cfg.format {
            OutputFormat::Json => Box::new(JsonPresenter { pretty: cfg.pretty }),
            OutputFormat::Text => Box::new(TextPresenter { pretty: cfg.pretty }),
        };
        Emitter { presenter }
    }

    pub fn emit_to(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        self.presenter.emit(env, w)?;
        w.flush()
    }

    pub fn emit(&self, env: &Envelope) -> io::Result<()> {
        let mut out = io::stdout();
        self.emit_to(env, &mut out)
    }
}

fn to_io(e: serde_json::Error) -> io::Error { io::Error::new(io::ErrorKind::Other, e) }

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(cfg: OutputConfig, env: &Envelope) -> String {
        let mut buf: Vec<u8> = Vec::new();
        Emitter::new(cfg).emit_to(env, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn text_prints_report_verbatim() {
        let env = Envelope::result("lookup", &json!({"text": "\n123 MAIN ST\n\nSTORY      : 1"}), None).unwrap();
        let out = render(OutputConfig { format: OutputFormat::Text, pretty: false }, &env);
        assert_eq!(out, "\n123 MAIN ST\n\nSTORY      : 1\n");
    }

    #[test]
    fn text_without_text_field_prints_header() {
        let env = Envelope::plan("lookup", &json!({"requests": []}), None).unwrap();
        let out = render(OutputConfig { format: OutputFormat::Text, pretty: false }, &env);
        assert_eq!(out, "Plan: lookup\n");
    }

    #[test]
    fn json_is_single_line() {
        let env = Envelope::result("lookup", &json!({"found": false}), None).unwrap();
        let out = render(OutputConfig { format: OutputFormat::Json, pretty: false }, &env);
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("\"found\":false"));
    }
}
