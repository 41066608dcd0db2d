//! Decision Engine - one telemetry reading in, one DecisionRecord out
//!
//! ```text
//! STEP 1: Validate reading and destination catalog
//! STEP 2: Predict shelf life (physics + blend strategy)
//! STEP 3: Forecast countdown from the reading's timestamp
//! STEP 4: Survival-margin reroute over the destination catalog
//! STEP 5: Market pivot (ONLY on emergency rescue)
//! STEP 6: Trust score and liability from one shared deviation summary
//! STEP 7: Preserved cargo value and driver advice
//! STEP 8: Explanation of the resolved outcome
//! ```
//!
//! The engine holds only immutable, config-derived state. History and
//! destinations arrive per call in a [`ShipmentContext`], so a decision is a
//! pure function of its inputs.

use thiserror::Error;
use tracing::{debug, info, warn};

use super::outcome::resolve;
use crate::advisory::DriverRecommender;
use crate::config::ShieldConfig;
use crate::explanation::ExplanationGenerator;
use crate::ml_engine::ShelfLifePredictor;
use crate::optimization::{MarketPivotEngine, ProfitOptimizer, SurvivalOptimizer};
use crate::physics_engine::{forecast, ForecastSettings};
use crate::scoring::{DeviationBands, LiabilityEngine, TrustScoreEngine};
use crate::types::{
    check_destination_catalog, CatalogError, DecisionRecord, Destination, HistorySnapshot,
    RerouteDecision, RerouteOutcome, RouteStatus, TelemetryError, TelemetryReading,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecisionError {
    #[error("invalid telemetry: {0}")]
    InvalidTelemetry(#[from] TelemetryError),

    #[error("invalid catalog: {0}")]
    InvalidCatalog(#[from] CatalogError),

    #[error("cargo value must be finite and non-negative, got {0}")]
    InvalidCargoValue(f64),
}

/// Per-call inputs owned by the caller.
///
/// `history` should already include the reading being decided on.
/// `destinations[0]` is the planned destination.
#[derive(Debug, Clone, Copy)]
pub struct ShipmentContext<'a> {
    pub history: &'a HistorySnapshot,
    pub destinations: &'a [Destination],
    pub cargo_value: f64,
}

pub struct DecisionEngine {
    shipment: String,
    base_shelf_life_days: f64,
    predictor: ShelfLifePredictor,
    forecast: ForecastSettings,
    optimizer: SurvivalOptimizer,
    pivot: MarketPivotEngine,
    bands: DeviationBands,
    trust: TrustScoreEngine,
    liability: LiabilityEngine,
    profit: ProfitOptimizer,
    driver: DriverRecommender,
    explainer: ExplanationGenerator,
}

impl DecisionEngine {
    /// Fails at startup when the market catalog lacks its fallback market.
    pub fn from_config(config: &ShieldConfig) -> Result<Self, CatalogError> {
        let pivot = MarketPivotEngine::from_config(config)?;
        let engine = Self {
            shipment: config.shipment.name.clone(),
            base_shelf_life_days: config.shipment.base_shelf_life_days,
            predictor: ShelfLifePredictor::from_config(config),
            forecast: ForecastSettings {
                warning_days: config.prediction.warning_days,
                critical_days: config.prediction.critical_days,
                horizons_hrs: config.prediction.forecast_horizons_hrs.clone(),
            },
            optimizer: SurvivalOptimizer::from_config(config),
            pivot,
            bands: DeviationBands::from_config(config),
            trust: TrustScoreEngine::from_config(config),
            liability: LiabilityEngine::from_config(config),
            profit: ProfitOptimizer::from_config(config),
            driver: DriverRecommender::from_config(config),
            explainer: ExplanationGenerator::from_config(config),
        };

        info!(
            shipment = %engine.shipment,
            base_shelf_life_days = engine.base_shelf_life_days,
            predictor = engine.predictor.strategy_name(),
            pivot_enabled = engine.optimizer.pivot_enabled(),
            markets = engine.pivot.markets().len(),
            fallback_market = %engine.pivot.fallback().name,
            "Decision engine initialized"
        );
        Ok(engine)
    }

    pub fn shipment(&self) -> &str {
        &self.shipment
    }

    pub fn decide(
        &self,
        reading: &TelemetryReading,
        ctx: &ShipmentContext<'_>,
    ) -> Result<DecisionRecord, DecisionError> {
        // STEP 1: Reject what the core cannot trust
        reading.validate()?;
        check_destination_catalog(ctx.destinations)?;
        if !ctx.cargo_value.is_finite() || ctx.cargo_value < 0.0 {
            return Err(DecisionError::InvalidCargoValue(ctx.cargo_value));
        }

        // STEP 2: Shelf life
        let prediction = self.predictor.predict(reading, self.base_shelf_life_days);

        // STEP 3: Countdown
        let forecast = forecast(&prediction, reading.timestamp, &self.forecast);

        // STEP 4: Reroute
        let reroute = self.optimizer.optimize(prediction.days_left, ctx.destinations);

        // STEP 5: Pivot only when no destination survives and salvage is enabled
        let pivot = (reroute.outcome == RerouteOutcome::EmergencyRescue).then(|| {
            self.pivot.pivot(
                prediction.hours_left(),
                planned_eta_hrs(&reroute),
                ctx.cargo_value,
            )
        });

        // STEP 6: Scoring off one deviation summary
        let deviations = self.bands.summarize(ctx.history);
        let trust = self.trust.score_with(ctx.history, &deviations);
        let liability = self.liability.attribute_with(&deviations);

        // STEP 7: Value and driver advice
        let value = self
            .profit
            .assess(ctx.cargo_value, prediction.days_left, self.base_shelf_life_days);
        let driver_advice = self.driver.recommend(reading, reroute.driving_margin_hrs());
        if driver_advice.has_critical() {
            warn!(
                shipment = %self.shipment,
                critical = driver_advice.critical,
                first = %driver_advice.recommendations[0].message,
                "Critical driver advice"
            );
        }

        // STEP 8: Narrate
        let outcome = resolve(&reroute, pivot.as_ref());
        let mut explanation =
            self.explainer
                .explain(&prediction, &reroute, pivot.as_ref(), &trust, &liability);
        self.explainer
            .append_advisory(&mut explanation, &value, &driver_advice);

        debug!(
            days_left = prediction.days_left,
            mode = ?prediction.mode,
            reroute = ?reroute.outcome,
            trust = trust.value,
            "Decision trace"
        );
        info!(
            shipment = %self.shipment,
            outcome = %outcome,
            days_left = prediction.days_left,
            status = %prediction.status,
            "{}",
            explanation.headline
        );

        Ok(DecisionRecord {
            shipment: self.shipment.clone(),
            reading: reading.clone(),
            prediction,
            forecast,
            reroute,
            pivot,
            trust,
            liability,
            outcome,
            value,
            driver_advice,
            explanation,
        })
    }
}

/// Travel time to the planned (first) destination, or infinity when it was
/// not evaluated because it is blocked or over capacity.
fn planned_eta_hrs(reroute: &RerouteDecision) -> f64 {
    reroute
        .assessments
        .first()
        .filter(|a| a.status == RouteStatus::Evaluated)
        .and_then(|a| a.travel_time_hrs)
        .unwrap_or(f64::INFINITY)
}
