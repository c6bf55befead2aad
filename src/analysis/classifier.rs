//! Font clustering and structural role inference.
//!
//! Usages are grouped by (family, weight, style). Each group is summarized
//! by its median size, the most frequent upright regular group becomes the
//! body font, and every other group gets a role from its size ratio to the
//! body font. The result is an immutable [`ClassificationResult`] that is
//! passed explicitly to later lookups.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::metrics::{font_style, font_weight, normalize_family};
use crate::model::{FontCluster, FontRole, FontStyle, FontUsage, FontWeight, Span};

/// Tolerance for band edges, so 1.1 * 12 / 12 still lands in [1.1, 1.15].
const BAND_EPSILON: f32 = 1e-4;

/// Ratio bands checked in priority order before the small/emphasis rules.
const ROLE_BANDS: &[(f32, f32, FontRole)] = &[
    (2.0, 2.5, FontRole::H1),
    (1.5, 1.8, FontRole::H2),
    (1.2, 1.4, FontRole::H3),
    (1.1, 1.15, FontRole::H4),
];

const SMALL_RATIO: f32 = 0.9;

/// Distance weights for point lookup.
const FAMILY_MISMATCH_PENALTY: f32 = 10.0;
const WEIGHT_MISMATCH_PENALTY: f32 = 0.5;
const STYLE_MISMATCH_PENALTY: f32 = 0.5;

/// Outcome of one classification run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Clusters sorted by descending usage count
    pub clusters: Vec<FontCluster>,
    /// Index of the body cluster in `clusters`
    pub body_index: Option<usize>,
}

impl ClassificationResult {
    /// Representative size of the body font, if any cluster exists.
    pub fn body_font_size(&self) -> Option<f32> {
        self.body_cluster().map(|c| c.size)
    }

    /// The cluster designated as body text.
    pub fn body_cluster(&self) -> Option<&FontCluster> {
        self.body_index.and_then(|i| self.clusters.get(i))
    }

    /// Whether no usages were classified.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Role for an arbitrary font context.
    ///
    /// Picks the nearest classified cluster. Without one, falls back to size
    /// thresholds against the body size, and to `Body` when that is unknown.
    pub fn role_for(
        &self,
        family: &str,
        size: f32,
        weight: FontWeight,
        style: FontStyle,
    ) -> FontRole {
        let family = normalize_family(family);
        let mut best: Option<(f32, FontRole)> = None;

        for cluster in &self.clusters {
            let Some(role) = cluster.role else {
                continue;
            };
            let mut distance = (cluster.size - size).abs();
            if cluster.family != family {
                distance += FAMILY_MISMATCH_PENALTY;
            }
            if cluster.weight != weight {
                distance += WEIGHT_MISMATCH_PENALTY;
            }
            if cluster.style != style {
                distance += STYLE_MISMATCH_PENALTY;
            }
            // Strict comparison keeps the first of equally distant clusters.
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, role));
            }
        }

        match best {
            Some((_, role)) => role,
            None => self.fallback_role(size),
        }
    }

    /// Role for a font name as it appears in the document.
    pub fn role_for_font(&self, font_name: &str, size: f32) -> FontRole {
        self.role_for(font_name, size, font_weight(font_name), font_style(font_name))
    }

    fn fallback_role(&self, size: f32) -> FontRole {
        let body_size = match self.body_font_size() {
            Some(s) if s > 0.0 => s,
            _ => return FontRole::Body,
        };
        let ratio = size / body_size;
        if ratio >= 2.0 {
            FontRole::H1
        } else if ratio >= 1.5 {
            FontRole::H2
        } else if ratio >= 1.2 {
            FontRole::H3
        } else {
            FontRole::Body
        }
    }
}

/// Cluster font usages and infer a role for every cluster.
///
/// `usages` is any map-like sequence of `(key, instances)`; the key is not
/// interpreted. Groups keep their first-seen order, so ties in usage count
/// resolve by iteration order of the input.
pub fn classify_fonts<K, V, I>(usages: I) -> ClassificationResult
where
    I: IntoIterator<Item = (K, V)>,
    V: AsRef<[FontUsage]>,
{
    let mut order: Vec<(String, FontWeight, FontStyle)> = Vec::new();
    let mut groups: HashMap<(String, FontWeight, FontStyle), Vec<f32>> = HashMap::new();

    for (_, instances) in usages {
        for usage in instances.as_ref() {
            let key = (usage.family.clone(), usage.weight, usage.style);
            groups
                .entry(key)
                .or_insert_with_key(|k| {
                    order.push(k.clone());
                    Vec::new()
                })
                .push(usage.size);
        }
    }

    let mut clusters: Vec<FontCluster> = order
        .into_iter()
        .filter_map(|key| {
            let sizes = groups.remove(&key)?;
            let (family, weight, style) = key;
            Some(build_cluster(family, weight, style, sizes))
        })
        .collect();

    // Stable: equal counts keep first-seen order.
    clusters.sort_by(|a, b| b.count.cmp(&a.count));

    let body_index = clusters
        .iter()
        .position(FontCluster::is_plain)
        .or(if clusters.is_empty() { None } else { Some(0) });

    let mut result = ClassificationResult {
        clusters,
        body_index,
    };
    infer_roles(&mut result);

    log::debug!(
        "Classified {} font clusters, body size {:?}",
        result.clusters.len(),
        result.body_font_size()
    );

    result
}

/// Give every span a role from the classification, keeping existing roles.
pub fn assign_roles(spans: &mut [Span], result: &ClassificationResult) {
    for span in spans.iter_mut() {
        if span.role.is_some() {
            continue;
        }
        let role = result.role_for_font(&span.font_name, span.font_size);
        span.assign_role(role);
    }
}

fn build_cluster(
    family: String,
    weight: FontWeight,
    style: FontStyle,
    mut sizes: Vec<f32>,
) -> FontCluster {
    sizes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let size = median(&sizes);
    let stddev = population_stddev(&sizes);

    let confidence = if size > 0.0 && sizes.len() > 1 {
        (1.0 - (stddev / size).min(1.0)).clamp(0.0, 1.0)
    } else {
        1.0
    };

    FontCluster {
        family,
        weight,
        style,
        size,
        count: sizes.len(),
        confidence,
        role: None,
    }
}

/// Median of sorted values; mean of the middle pair for even lengths.
fn median(sorted: &[f32]) -> f32 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

fn population_stddev(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
    variance.sqrt()
}

fn infer_roles(result: &mut ClassificationResult) {
    let Some(body_index) = result.body_index else {
        return;
    };
    result.clusters[body_index].role = Some(FontRole::Body);
    let body_size = result.clusters[body_index].size;

    for cluster in result.clusters.iter_mut() {
        if cluster.role.is_some() {
            continue;
        }
        cluster.role = Some(if body_size > 0.0 {
            role_from_ratio(cluster.size / body_size, cluster.weight, cluster.style)
        } else {
            FontRole::Body
        });
    }
}

fn role_from_ratio(ratio: f32, weight: FontWeight, style: FontStyle) -> FontRole {
    for (low, high, role) in ROLE_BANDS {
        if ratio >= low - BAND_EPSILON && ratio <= high + BAND_EPSILON {
            return *role;
        }
    }
    if ratio < SMALL_RATIO {
        FontRole::Small
    } else if weight == FontWeight::Bold || style == FontStyle::Italic {
        FontRole::Emphasis
    } else {
        FontRole::Body
    }
}
