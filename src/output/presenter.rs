use std::io::{self, Write};

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

/// Dry runs print the text that would have been pushed; real runs a summary line.
pub struct TextPresenter { pub pretty: bool }
impl Presenter for TextPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        if env.apply {
            let summary = env.result.as_ref().and_then(|r| r.get("summary")).and_then(|v| v.as_str());
            match summary {
                Some(s) => writeln!(w, "Result: {}: {}", env.op, s)?,
                None => writeln!(w, "Result: {}", env.op)?,
            }
            if self.pretty {
                if let Some(res) = &env.result { serde_json::to_writer_pretty(&mut *w, res).map_err(to_io)?; writeln!(w)?; }
            }
        } else {
            writeln!(w, "Plan: {}", env.op)?;
            if let Some(content) = env.plan.as_ref().and_then(|p| p.get("content")).and_then(|v| v.as_str()) {
                writeln!(w, "{content}")?;
            }
        }
        Ok(())
    }
}

pub struct Emitter {
    presenter: Box<dyn Presenter>,
}

impl Emitter {
    pub fn from_env(cfg: OutputConfig) -> Self {
        let presenter: Box<dyn Presenter> = match cfg.format {
            OutputFormat::Json => Box::new(JsonPresenter { pretty: cfg.pretty }),
            OutputFormat::Text => Box::new(TextPresenter { pretty: cfg.pretty }),
        };
        Emitter { presenter }
    }

    pub fn emit(&self, env: &Envelope) -> io::Result<()> {
        let mut out = io::stdout();
        self.presenter.emit(env, &mut out)?;
        out.flush()
    }
}

fn to_io(e: serde_json::Error) -> io::Error { io::Error::new(io::ErrorKind::Other, e) }

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(p: &dyn Presenter, env: &Envelope) -> String {
        let mut buf = Vec::new();
        p.emit(env, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn text_plan_prints_content() {
        let env = Envelope::plan("push", &json!({"content": "body\nline"})).unwrap();
        assert_eq!(render(&TextPresenter { pretty: false }, &env), "Plan: push\nbody\nline\n");
    }

    #[test]
    fn text_result_prints_summary() {
        let env = Envelope::result("push", &json!({"summary": "pushed 2 platforms"})).unwrap();
        assert_eq!(render(&TextPresenter { pretty: false }, &env), "Result: push: pushed 2 platforms\n");
    }

    #[test]
    fn json_presenter_is_one_line() {
        let env = Envelope::result("push", &json!({"pushed": true})).unwrap();
        let out = render(&JsonPresenter { pretty: false }, &env);
        assert_eq!(out.lines().count(), 1);
        let v: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(v["result"]["pushed"], true);
    }
}
