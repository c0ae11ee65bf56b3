//! Text and JSON rendering of a finished run

use std::fmt::Write;

use nestegg_core::model::ReturnStatistics;
use nestegg_core::{
    AggregationMode, Comparison, Inference, QueryError, SimulationParameters, SimulationSummary,
};
use serde::Serialize;

use crate::util::format::{
    format_bucket_label, format_currency, format_currency_short, format_percentage,
};

/// Which side of the inference the caller fixed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InferenceQuery {
    /// Tail probability in percent; the value is derived
    Probability(f64),
    /// Portfolio value; the probability is derived
    Value(f64),
}

impl Default for InferenceQuery {
    fn default() -> Self {
        Self::Probability(5.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct YearlyValue {
    pub year: u32,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportBucket {
    pub label: String,
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    pub frequency: f64,
    /// Bucket holding the most terminal values
    pub modal: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub parameters: SimulationParameters,
    pub iterations: usize,
    pub final_mean: f64,
    pub final_median: f64,
    pub aggregation: AggregationMode,
    pub yearly: Vec<YearlyValue>,
    pub histogram: Vec<ReportBucket>,
    /// Terminal values trimmed from the histogram as outliers
    pub outliers: usize,
    pub inference: Inference,
}

impl Report {
    pub fn build(
        summary: &SimulationSummary,
        aggregation: AggregationMode,
        query: InferenceQuery,
        comparison: Comparison,
    ) -> Result<Self, QueryError> {
        let distribution = &summary.distribution;
        let inference = match query {
            InferenceQuery::Probability(p) => distribution.reconcile(p, comparison)?,
            InferenceQuery::Value(v) => distribution.infer_from_value(v, comparison)?,
        };
        let histogram = distribution.histogram()?;
        let modal_lower = histogram.mode_bucket().map(|b| b.lower);

        let yearly = summary
            .series(aggregation)
            .yearly()
            .into_iter()
            .map(|(year, value)| YearlyValue { year, value })
            .collect();

        let buckets = histogram
            .buckets
            .iter()
            .map(|b| ReportBucket {
                label: format_bucket_label(b.lower),
                lower: b.lower,
                upper: b.upper,
                count: b.count,
                frequency: b.frequency,
                modal: Some(b.lower) == modal_lower,
            })
            .collect();

        Ok(Self {
            parameters: summary.parameters,
            iterations: summary.iterations,
            final_mean: summary.final_mean().ok_or(QueryError::EmptyDistribution)?,
            final_median: summary.final_median().ok_or(QueryError::EmptyDistribution)?,
            aggregation,
            yearly,
            histogram: buckets,
            outliers: histogram.excluded,
            inference,
        })
    }

    /// One-sentence reading of the inference
    pub fn inference_sentence(&self) -> String {
        format!(
            "There is a {:.2}% probability that the portfolio's value will be {} {}",
            self.inference.probability,
            self.inference.comparison.phrase(),
            format_currency(self.inference.value)
        )
    }

    pub fn render_text(&self) -> String {
        let params = &self.parameters;
        let mut out = String::new();

        let flow = if params.is_withdrawal() {
            "Monthly withdrawal"
        } else {
            "Monthly contribution"
        };
        let _ = writeln!(out, "Principal:            {}", format_currency(params.principal));
        let _ = writeln!(
            out,
            "{flow:<22}{}",
            format_currency(params.periodic_contribution.abs())
        );
        let _ = writeln!(
            out,
            "Horizon:              {} months ({:.1} years)",
            params.horizon_periods,
            params.horizon_years()
        );
        let _ = writeln!(out, "Simulations:          {}", self.iterations);
        let _ = writeln!(out);
        let _ = writeln!(out, "Final average:        {}", format_currency(self.final_mean));
        let _ = writeln!(out, "Final median:         {}", format_currency(self.final_median));

        let _ = writeln!(out);
        let _ = writeln!(out, "{} value by year", self.aggregation.label());
        for point in &self.yearly {
            let _ = writeln!(
                out,
                "  {:>4}  {:>18}",
                point.year,
                format_currency_short(point.value)
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Terminal value distribution ({} outliers trimmed)",
            self.outliers
        );
        for bucket in &self.histogram {
            let _ = writeln!(
                out,
                "  {:>10}  {:>7}{}",
                bucket.label,
                format_percentage(bucket.frequency),
                if bucket.modal { "  <- most likely" } else { "" }
            );
        }

        let _ = writeln!(out);
        if self.inference.adjusted {
            if let Some(requested) = self.inference.requested_probability {
                let _ = writeln!(
                    out,
                    "Requested {requested:.2}% falls in a run of equal outcomes; showing the recomputed probability"
                );
            }
        }
        let _ = writeln!(out, "\"{}\"", self.inference_sentence());

        out
    }
}

/// Descriptive statistics of a return series
pub fn render_statistics(stats: &ReturnStatistics) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Months of history:     {} ({:.1} years)",
        stats.periods,
        stats.years()
    );
    let _ = writeln!(out, "Mean monthly return:   {}", format_percentage(stats.arithmetic_mean));
    let _ = writeln!(out, "Geometric mean:        {}", format_percentage(stats.geometric_mean));
    let _ = writeln!(out, "Monthly std dev:       {}", format_percentage(stats.std_dev));
    let _ = writeln!(out, "Worst month:           {}", format_percentage(stats.min));
    let _ = writeln!(out, "Best month:            {}", format_percentage(stats.max));
    let _ = writeln!(
        out,
        "Annualized growth:     {}",
        format_percentage(stats.annualized_growth())
    );
    let _ = writeln!(
        out,
        "Annualized volatility: {}",
        format_percentage(stats.annualized_volatility())
    );
    out
}
