// MotionWatch: Activity Classifier
//
// Static-threshold rules over the absolute linear acceleration of a single
// sample. Rules are evaluated in order and the first match wins; a sample no
// rule claims falls back to `Standing`. The thresholds are a coarse heuristic,
// not a calibrated model, and must stay exactly as they are.

use crate::sample::{ActivityLabel, Axes, Sample};

/// One classification rule: a predicate over |ax|, |ay|, |az|.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub label: ActivityLabel,
    pub matches: fn(&Magnitudes) -> bool,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("label", &self.label)
            .finish()
    }
}

/// Absolute linear acceleration per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Magnitudes {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<&Axes> for Magnitudes {
    fn from(axes: &Axes) -> Self {
        Self {
            x: axes.ax.abs(),
            y: axes.ay.abs(),
            z: axes.az.abs(),
        }
    }
}

fn in_walking_band(v: f32) -> bool {
    4.0 < v && v <= 8.0
}

pub const DEFAULT_RULES: [Rule; 4] = [
    Rule {
        name: "horizontal above 8",
        label: ActivityLabel::Running,
        matches: |m| m.x > 8.0 || m.y > 8.0,
    },
    Rule {
        name: "horizontal in (4, 8]",
        label: ActivityLabel::Walking,
        matches: |m| in_walking_band(m.x) || in_walking_band(m.y),
    },
    Rule {
        name: "upright and still",
        label: ActivityLabel::Standing,
        matches: |m| m.x < 2.0 && m.y < 2.0 && m.z > 8.0,
    },
    Rule {
        name: "vertical below 2",
        label: ActivityLabel::Falling,
        matches: |m| m.z < 2.0,
    },
];

pub const DEFAULT_FALLBACK: ActivityLabel = ActivityLabel::Standing;

#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
    fallback: ActivityLabel,
}

impl Classifier {
    pub fn new(rules: Vec<Rule>, fallback: ActivityLabel) -> Self {
        Self { rules, fallback }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn classify(&self, sample: &Sample) -> ActivityLabel {
        first_match(&self.rules, self.fallback, sample)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.to_vec(), DEFAULT_FALLBACK)
    }
}

/// Classify with the default rule table.
pub fn classify(sample: &Sample) -> ActivityLabel {
    first_match(&DEFAULT_RULES, DEFAULT_FALLBACK, sample)
}

fn first_match(rules: &[Rule], fallback: ActivityLabel, sample: &Sample) -> ActivityLabel {
    let magnitudes = Magnitudes::from(&sample.axes());
    rules
        .iter()
        .find(|rule| (rule.matches)(&magnitudes))
        .map_or(fallback, |rule| rule.label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accel(ax: f32, ay: f32, az: f32) -> Sample {
        Sample::new(0, Axes::new(ax, ay, az, 0.0, 0.0, 0.0))
    }

    #[test]
    fn scenarios() {
        assert_eq!(classify(&accel(9.0, 0.0, 0.0)), ActivityLabel::Running);
        assert_eq!(classify(&accel(0.0, 0.0, 9.0)), ActivityLabel::Standing);
        assert_eq!(classify(&accel(5.0, 0.0, 0.0)), ActivityLabel::Walking);
        assert_eq!(classify(&accel(0.0, 0.0, 1.0)), ActivityLabel::Falling);
    }

    #[test]
    fn running_ignores_other_axes() {
        let others = [-20.0f32, -1.0, 0.0, 3.5, 9.81, 50.0];
        for &lead in &[8.01f32, -8.5, 12.0, -100.0] {
            for &o in &others {
                let x = Sample::new(5, Axes::new(lead, o, o, o, -o, o));
                let y = Sample::new(5, Axes::new(o.clamp(-8.0, 8.0), lead, o, o, o, -o));
                assert_eq!(classify(&x), ActivityLabel::Running, "ax={lead} other={o}");
                assert_eq!(classify(&y), ActivityLabel::Running, "ay={lead} other={o}");
            }
        }
    }

    #[test]
    fn upright_and_still_is_standing() {
        for &(ax, ay, az) in &[(0.0, 0.0, 8.01), (1.99, -1.99, -9.8), (-0.3, 0.7, 15.0)] {
            assert_eq!(classify(&accel(ax, ay, az)), ActivityLabel::Standing);
        }
    }

    #[test]
    fn band_edges() {
        // Exactly 8 is walking, exactly 4 is not.
        assert_eq!(classify(&accel(8.0, 0.0, 9.8)), ActivityLabel::Walking);
        assert_eq!(classify(&accel(0.0, -8.0, 9.8)), ActivityLabel::Walking);
        assert_eq!(classify(&accel(4.0, 0.0, 9.8)), ActivityLabel::Standing);
        assert_eq!(classify(&accel(4.0, 0.0, 1.0)), ActivityLabel::Falling);
        // |az| exactly 2 and moderate tilt: no rule matches.
        assert_eq!(classify(&accel(3.0, 0.0, 2.0)), ActivityLabel::Standing);
    }

    #[test]
    fn deterministic() {
        let s = Sample::new(10, Axes::new(-3.3, 2.2, 1.1, 0.4, 0.5, 0.6));
        assert_eq!(classify(&s), classify(&s));
    }

    #[test]
    fn default_classifier_matches_table() {
        let classifier = Classifier::default();
        assert_eq!(classifier.rules().len(), DEFAULT_RULES.len());
        for &(ax, ay, az) in &[(9.0, 0.0, 0.0), (5.0, 0.0, 0.0), (0.0, 0.0, 9.0), (0.0, 0.0, 1.0), (3.0, 3.0, 5.0)] {
            let s = accel(ax, ay, az);
            assert_eq!(classifier.classify(&s), classify(&s));
        }
    }

    #[test]
    fn replaceable_policy() {
        let classifier = Classifier::new(
            vec![Rule {
                name: "anything vertical",
                label: ActivityLabel::Falling,
                matches: |m| m.z > 0.0,
            }],
            ActivityLabel::Unknown,
        );
        assert_eq!(classifier.classify(&accel(0.0, 0.0, 9.0)), ActivityLabel::Falling);
        assert_eq!(classifier.classify(&accel(9.0, 0.0, 0.0)), ActivityLabel::Unknown);
    }
}
