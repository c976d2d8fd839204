//! Step-by-step calculation trace returned to callers in debug mode.

use serde::Serialize;
use serde_json::{Map, Value};

/// One recorded step: a short tag plus the values it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEntry {
    /// Step tag, e.g. `custo_direto_default_setor`
    pub msg: String,
    /// Values attached to the step, flattened next to `msg`
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Ordered list of trace entries for one calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CalcTrace {
    entries: Vec<TraceEntry>,
}

impl CalcTrace {
    /// Empty trace
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a step with no attached values.
    pub fn record(&mut self, msg: impl Into<String>) {
        self.entries.push(TraceEntry {
            msg: msg.into(),
            fields: Map::new(),
        });
    }

    /// Record a step with attached values.
    ///
    /// Objects are flattened into the entry; any other value is stored
    /// under `valor`.
    pub fn record_with(&mut self, msg: impl Into<String>, fields: Value) {
        let fields = match fields {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("valor".to_string(), other);
                map
            }
        };
        self.entries.push(TraceEntry {
            msg: msg.into(),
            fields,
        });
    }

    /// Recorded entries, oldest first
    #[must_use]
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Whether a step with this tag was recorded
    #[must_use]
    pub fn contains(&self, msg: &str) -> bool {
        self.entries.iter().any(|e| e.msg == msg)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entries_flatten_their_fields() {
        let mut trace = CalcTrace::new();
        trace.record("payload_recebido");
        trace.record_with("churn_default", json!({ "churn": 0.05 }));
        trace.record_with("erro_interno", json!("boom"));

        assert_eq!(
            serde_json::to_value(&trace).unwrap(),
            json!([
                { "msg": "payload_recebido" },
                { "msg": "churn_default", "churn": 0.05 },
                { "msg": "erro_interno", "valor": "boom" }
            ])
        );
        assert!(trace.contains("churn_default"));
        assert_eq!(trace.len(), 3);
    }
}
