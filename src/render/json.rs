//! JSON day view for scripting

use std::io::Write;

use serde_json::json;

use crate::render::Presenter;
use crate::types::{HealthLogError, MergedLogRecord, Result, UserSummary};

pub struct JsonPresenter<W> {
    out: W,
}

impl<W: Write> JsonPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, value: &serde_json::Value) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.out, value)
            .map_err(|e| HealthLogError::Io(e.into()))?;
        writeln!(self.out)?;
        Ok(())
    }
}

impl<W: Write> Presenter for JsonPresenter<W> {
    fn render(&mut self, feed: &[MergedLogRecord], summaries: &[UserSummary]) -> Result<()> {
        self.write(&json!({ "feed": feed, "summaries": summaries }))
    }

    fn render_comparison(
        &mut self,
        today: &[UserSummary],
        yesterday: &[UserSummary],
    ) -> Result<()> {
        self.write(&json!({ "today": today, "yesterday": yesterday }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DaySummary, LogRecord, LogValue, UserId};

    #[test]
    fn test_render_json_shape() {
        let feed = vec![MergedLogRecord {
            record: LogRecord::new("a", 42, LogValue::Pee),
            original_user: UserId::from("Me"),
        }];
        let summaries = vec![UserSummary {
            user: UserId::from("Me"),
            label: "我".into(),
            summary: DaySummary {
                pee_count: 1,
                ..Default::default()
            },
        }];

        let mut presenter = JsonPresenter::new(Vec::new());
        presenter.render(&feed, &summaries).unwrap();
        let value: serde_json::Value =
            serde_json::from_slice(&presenter.into_inner()).unwrap();

        assert_eq!(value["feed"][0]["originalUser"], "Me");
        assert_eq!(value["feed"][0]["type"], "pee");
        assert_eq!(value["summaries"][0]["summary"]["peeCount"], 1);
    }
}
