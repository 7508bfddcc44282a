//! The filter pipeline applied to merged results.

use chrono::{DateTime, Utc};
use mentionscan_core::{FilterSpec, Mention};

/// Apply every set filter as an ANDed predicate.
///
/// Pure and stable: same mentions + same spec + same `now` produce the same
/// output in the same relative order; unset fields impose no constraint.
/// `now` is a parameter (rather than read from the clock) so the period
/// window is reproducible.
#[must_use]
pub fn apply(mentions: Vec<Mention>, filters: &FilterSpec, now: DateTime<Utc>) -> Vec<Mention> {
    if filters.is_unconstrained() {
        return mentions;
    }
    // Lowercase the refinement term once, not per mention.
    let contains = filters.contains.as_deref().map(str::to_lowercase);
    let cutoff = filters.period.map(|p| now - p.window());

    mentions
        .into_iter()
        .filter(|m| matches(m, filters, cutoff, contains.as_deref()))
        .collect()
}

fn matches(
    mention: &Mention,
    filters: &FilterSpec,
    cutoff: Option<DateTime<Utc>>,
    contains: Option<&str>,
) -> bool {
    if let Some(sentiment) = filters.sentiment {
        if mention.sentiment != sentiment {
            return false;
        }
    }

    let total = mention.engagement.total();
    if filters.min_engagement.is_some_and(|min| total < min) {
        return false;
    }
    if filters.max_engagement.is_some_and(|max| total > max) {
        return false;
    }

    if cutoff.is_some_and(|cutoff| mention.created_at < cutoff) {
        return false;
    }

    if let Some(content_type) = filters.content_type {
        if mention.content_type != content_type {
            return false;
        }
    }

    // A mention with no origin country cannot satisfy a geographic scope.
    if let Some(country) = filters.country.as_deref() {
        let matched = mention
            .country
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(country));
        if !matched {
            return false;
        }
    }

    if let Some(term) = contains {
        if !mention.text.to_lowercase().contains(term) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use mentionscan_core::{ContentType, Engagement, Period, Platform, Sentiment};

    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_756_000_000, 0).unwrap()
    }

    fn mention(id: &str) -> Mention {
        Mention {
            source_id: id.to_owned(),
            platform: Platform::Reddit,
            text: format!("mention {id}"),
            author: "someone".to_owned(),
            url: None,
            sentiment: Sentiment::Neutral,
            engagement: Engagement::default(),
            reach: 0,
            content_type: ContentType::Post,
            country: None,
            created_at: now() - Duration::hours(1),
        }
    }

    #[test]
    fn unconstrained_spec_passes_everything_through() {
        let input = vec![mention("a"), mention("b")];
        let output = apply(input.clone(), &FilterSpec::default(), now());
        assert_eq!(output, input);
    }

    #[test]
    fn sentiment_filter_is_exact() {
        let mut negative = mention("neg");
        negative.sentiment = Sentiment::Negative;
        let spec = FilterSpec {
            sentiment: Some(Sentiment::Negative),
            ..FilterSpec::default()
        };
        let output = apply(vec![mention("a"), negative.clone()], &spec, now());
        assert_eq!(output, vec![negative]);
    }

    #[test]
    fn engagement_bounds_are_inclusive() {
        let mut low = mention("low");
        low.engagement.likes = 4;
        let mut mid = mention("mid");
        mid.engagement.likes = 5;
        let mut high = mention("high");
        high.engagement.likes = 11;

        let spec = FilterSpec {
            min_engagement: Some(5),
            max_engagement: Some(10),
            ..FilterSpec::default()
        };
        let output = apply(vec![low, mid.clone(), high], &spec, now());
        assert_eq!(output, vec![mid]);
    }

    #[test]
    fn period_window_excludes_old_mentions() {
        let mut old = mention("old");
        old.created_at = now() - Duration::days(3);
        let recent = mention("recent");

        let spec = FilterSpec {
            period: Some(Period::LastDay),
            ..FilterSpec::default()
        };
        let output = apply(vec![old, recent.clone()], &spec, now());
        assert_eq!(output, vec![recent]);
    }

    #[test]
    fn country_scope_excludes_unknown_origin() {
        let mut french = mention("fr");
        french.country = Some("FR".to_owned());
        let unknown = mention("unknown");

        let spec = FilterSpec {
            country: Some("fr".to_owned()),
            ..FilterSpec::default()
        };
        let output = apply(vec![french.clone(), unknown], &spec, now());
        assert_eq!(output, vec![french], "case-insensitive match, unknown dropped");
    }

    #[test]
    fn contains_filter_is_case_insensitive() {
        let mut hit = mention("hit");
        hit.text = "Booster uptake is slowing".to_owned();
        let miss = mention("miss");

        let spec = FilterSpec {
            contains: Some("BOOSTER".to_owned()),
            ..FilterSpec::default()
        };
        let output = apply(vec![hit.clone(), miss], &spec, now());
        assert_eq!(output, vec![hit]);
    }

    #[test]
    fn filters_compose_with_and_semantics() {
        let mut matches_both = mention("both");
        matches_both.sentiment = Sentiment::Negative;
        matches_both.engagement.likes = 100;
        let mut matches_one = mention("one");
        matches_one.sentiment = Sentiment::Negative;

        let spec = FilterSpec {
            sentiment: Some(Sentiment::Negative),
            min_engagement: Some(50),
            ..FilterSpec::default()
        };
        let output = apply(vec![matches_both.clone(), matches_one], &spec, now());
        assert_eq!(output, vec![matches_both]);
    }

    #[test]
    fn filtering_never_reorders_survivors() {
        let mut a = mention("a");
        a.engagement.likes = 9;
        let mut b = mention("b");
        b.engagement.likes = 100;
        let mut c = mention("c");
        c.engagement.likes = 10;

        let spec = FilterSpec {
            min_engagement: Some(10),
            ..FilterSpec::default()
        };
        let output = apply(vec![a, b.clone(), c.clone()], &spec, now());
        assert_eq!(output, vec![b, c], "relative order preserved, no re-sort");
    }
}
