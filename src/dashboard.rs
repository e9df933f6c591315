use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::crossfilter::derive;
use crate::error::SelectionError;
use crate::filter::FilterState;
use crate::model::{Dataset, Dimension, DimensionValue};
use crate::present::{frame, Frame};

/// A "selection changed" event from one of the four multi-selects.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// Replace the selection on `dimension`; empty `values` means "all".
    Select {
        dimension: Dimension,
        values: Vec<DimensionValue>,
    },
    /// Return every dimension to "all".
    Reset,
}

/// Wire shape of an event, before per-dimension value decoding.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEvent {
    #[serde(default)]
    reset: bool,
    dimension: Option<Dimension>,
    #[serde(default)]
    values: Vec<serde_json::Value>,
}

impl SelectionEvent {
    /// Parse one event line.
    ///
    /// ```json
    /// {"dimension": "country", "values": ["Canada", "France"]}
    /// {"dimension": "year", "values": []}
    /// {"reset": true}
    /// ```
    pub fn from_json(json: &str) -> Result<Self, SelectionError> {
        let invalid = |reason: String| SelectionError::InvalidEvent { reason };
        let raw: RawEvent = serde_json::from_str(json).map_err(|e| invalid(e.to_string()))?;
        match (raw.reset, raw.dimension) {
            (true, None) if raw.values.is_empty() => Ok(SelectionEvent::Reset),
            (true, _) => Err(invalid(
                "reset cannot be combined with dimension or values".to_string(),
            )),
            (false, None) => Err(invalid("missing field `dimension`".to_string())),
            (false, Some(dimension)) => {
                let values = raw
                    .values
                    .iter()
                    .map(|v| dimension.decode_value(v))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(invalid)?;
                Ok(SelectionEvent::Select { dimension, values })
            }
        }
    }
}

/// One user session: the loaded dataset plus the live filter state.
///
/// Every interaction recomputes all derived views from scratch.
pub struct Dashboard {
    dataset: Dataset,
    state: FilterState,
}

impl Dashboard {
    #[must_use]
    pub fn new(dataset: Dataset) -> Self {
        let state = FilterState::new(&dataset);
        Self { dataset, state }
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[must_use]
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Recompute everything for the current selection.
    #[must_use]
    pub fn frame(&self) -> Frame {
        let views = derive(&self.dataset, &self.state);
        debug!(
            main = views.main.len(),
            by_country = views.by_country.len(),
            by_gender = views.by_gender.len(),
            by_category = views.by_category.len(),
            "derived views"
        );
        frame(&views, &self.state)
    }

    /// Apply `event` and return the new frame. On error the state is unchanged.
    pub fn apply(&mut self, event: SelectionEvent) -> Result<Frame, SelectionError> {
        match event {
            SelectionEvent::Select { dimension, values } => {
                let count = values.len();
                self.state.select(dimension, values)?;
                info!(%dimension, values = count, "filter updated");
            }
            SelectionEvent::Reset => {
                self.state.reset();
                info!("filters reset");
            }
        }
        Ok(self.frame())
    }

    /// Parse and apply one event line.
    pub fn apply_json(&mut self, json: &str) -> Result<Frame, SelectionError> {
        let event = SelectionEvent::from_json(json)?;
        self.apply(event)
    }

    /// Answer every event line of `input` on `out`, one JSON document per line.
    ///
    /// A rejected event is answered with `{"error": "..."}` and the session
    /// carries on. Blank lines are skipped.
    pub fn serve(&mut self, input: impl BufRead, out: &mut impl Write) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match self.apply_json(&line) {
                Ok(frame) => emit(out, &frame)?,
                Err(err) => {
                    warn!(%err, "selection rejected");
                    emit(out, &serde_json::json!({ "error": err.to_string() }))?;
                }
            }
        }
        Ok(())
    }
}

/// Write `value` as a single JSON line and flush.
pub fn emit(out: &mut impl Write, value: &impl Serialize) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    out.write_all(b"\n")?;
    out.flush()
}
