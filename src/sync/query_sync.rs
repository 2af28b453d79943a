use indexmap::IndexMap;
use tracing::debug;

use crate::{
    builder::SqlBuilder,
    config::EngineConfig,
    equivalence::QueryComparer,
    model::{StateError, VisualQueryState},
    params::{ParamScanner, ParamSubstitutor, ParamValue, QueryParameter, SubstitutedQuery},
    parser::QueryTranslator,
    schema::SchemaProvider,
    sync::SyncOutcome,
};

/// One query tab: the visual state, the editor text and the settings that
/// tie them together.
///
/// Edits arrive from either side. A visual edit only rewrites the text when
/// the text no longer describes the state, so user formatting survives
/// cosmetic round trips; a text edit only replaces the state when it parses
/// to a different query.
#[derive(Debug, Clone, Default)]
pub struct QuerySync {
    state: VisualQueryState,
    text: String,
    config: EngineConfig,
}

impl QuerySync {
    pub fn new(config: EngineConfig) -> Self {
        Self { state: VisualQueryState::new(), text: String::new(), config }
    }

    /// Start from an existing state, e.g. one restored from JSON.
    pub fn from_state(state: VisualQueryState, config: EngineConfig) -> Self {
        let text = SqlBuilder::generate(state.query());
        Self { state, text, config }
    }

    pub fn state(&self) -> &VisualQueryState {
        &self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Swap settings; the next edit is read with them.
    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    /// Apply `edit` to a copy of the state and commit it only when every
    /// step succeeds.
    pub fn edit_visual<F>(&mut self, schemas: &dyn SchemaProvider, edit: F) -> Result<SyncOutcome, StateError>
    where
        F: FnOnce(&mut VisualQueryState) -> Result<(), StateError>,
    {
        let mut next = self.state.clone();
        edit(&mut next)?;
        self.state = next;

        if self.text_matches_state(schemas) {
            debug!("visual edit already described by editor text, text kept");
            return Ok(SyncOutcome::Preserved);
        }
        self.text = SqlBuilder::generate(self.state.query());
        debug!(len = self.text.len(), "visual edit regenerated editor text");
        Ok(SyncOutcome::Regenerated)
    }

    /// Take new editor text. The text is always kept; the state follows it
    /// only when it parses.
    pub fn edit_sql(&mut self, text: &str, schemas: &dyn SchemaProvider) -> SyncOutcome {
        self.text = text.to_string();
        let parsed = match QueryTranslator::parse_with_config(text, &self.config, schemas) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(error = %err, "editor text rejected, visual state kept");
                return SyncOutcome::Rejected(err);
            },
        };
        if QueryComparer::equivalent(&parsed, self.state.query()) {
            debug!("editor text equivalent to visual state");
            return SyncOutcome::Preserved;
        }
        self.state.replace(parsed);
        debug!(tables = self.state.query().tables.len(), "visual state replaced from editor text");
        SyncOutcome::VisualUpdated
    }

    /// Overwrite the editor text with SQL generated from the state.
    pub fn regenerate(&mut self) -> &str {
        self.text = SqlBuilder::generate(self.state.query());
        &self.text
    }

    /// Prompts for the placeholders in the current text.
    pub fn parameters(&self) -> Vec<QueryParameter> {
        ParamScanner::create_default_parameters(&ParamScanner::extract_parameters(&self.text))
    }

    /// The current text with placeholders replaced for the configured dialect.
    pub fn prepare_execution(&self, values: &IndexMap<String, ParamValue>) -> SubstitutedQuery {
        ParamSubstitutor::substitute_parameters(&self.text, values, self.config.dialect)
    }

    fn text_matches_state(&self, schemas: &dyn SchemaProvider) -> bool {
        match QueryTranslator::parse_with_config(&self.text, &self.config, schemas) {
            Ok(parsed) => QueryComparer::equivalent(&parsed, self.state.query()),
            Err(_) => false,
        }
    }
}
