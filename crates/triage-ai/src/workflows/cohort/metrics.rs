use serde::Serialize;

/// Probability cut-offs reported alongside the decision threshold.
pub const SWEEP_THRESHOLDS: [f64; 3] = [0.5, 0.7, 0.9];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    pub fn tally<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = (bool, bool)>,
    {
        let mut matrix = Self::default();
        for (predicted, actual) in outcomes {
            match (predicted, actual) {
                (true, true) => matrix.true_positive += 1,
                (true, false) => matrix.false_positive += 1,
                (false, true) => matrix.false_negative += 1,
                (false, false) => matrix.true_negative += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    /// Recall on the ER class.
    pub fn sensitivity(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    pub fn specificity(&self) -> f64 {
        ratio(self.true_negative, self.true_negative + self.false_positive)
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdPoint {
    pub threshold: f64,
    pub sensitivity: f64,
    pub specificity: f64,
}

/// Classification quality of triage dispositions against labelled outcomes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationMetrics {
    pub decision_threshold: f64,
    pub confusion: ConfusionMatrix,
    pub accuracy: f64,
    pub sensitivity: f64,
    pub specificity: f64,
    pub precision: f64,
    pub sweep: Vec<ThresholdPoint>,
}

/// A scored, labelled patient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelledScore {
    pub probability: f64,
    pub referred: bool,
    pub actual: bool,
}

impl ClassificationMetrics {
    /// `None` when there is nothing labelled to measure.
    pub fn compute(scores: &[LabelledScore], decision_threshold: f64) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }

        let confusion = ConfusionMatrix::tally(
            scores.iter().map(|score| (score.referred, score.actual)),
        );
        let sweep = SWEEP_THRESHOLDS
            .iter()
            .map(|&threshold| {
                let matrix = ConfusionMatrix::tally(
                    scores
                        .iter()
                        .map(|score| (score.probability >= threshold, score.actual)),
                );
                ThresholdPoint {
                    threshold,
                    sensitivity: matrix.sensitivity(),
                    specificity: matrix.specificity(),
                }
            })
            .collect();

        Some(Self {
            decision_threshold,
            confusion,
            accuracy: confusion.accuracy(),
            sensitivity: confusion.sensitivity(),
            specificity: confusion.specificity(),
            precision: confusion.precision(),
            sweep,
        })
    }
}
