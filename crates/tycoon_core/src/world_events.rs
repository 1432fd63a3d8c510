//! Random world events: market drift, news, encrypted signals and email.
//!
//! Each generator rolls its trigger first and always consumes the same
//! number of draws for the trigger, so the stream stays aligned across ticks
//! whether or not the event fires.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{
    Email, EmailId, EmailKind, GameState, HardwareType, NewsItem, SignalWindow, TrendDirection,
};

pub const MARKET_SHIFT_CHANCE: f64 = 0.02;
pub const MARKET_SHIFT_MAX: f64 = 0.2;
/// Shifts larger than this make the news.
pub const NEWS_THRESHOLD: f64 = 0.1;
pub const TREND_MIN: f64 = 0.5;
pub const TREND_MAX: f64 = 2.0;
pub const NEWS_CAP: usize = 20;

pub const SIGNAL_CHANCE: f64 = 0.005;
pub const SIGNAL_WINDOW_MS: u64 = 90_000;

pub const EMAIL_CHANCE: f64 = 0.002;
pub const EMAIL_CAP: usize = 50;
pub const JOB_REPUTATION: i64 = 500;
pub const THREAT_TRACE: f64 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MarketShift {
    pub category: HardwareType,
    pub multiplier: f64,
    pub delta: f64,
    pub news: Option<NewsItem>,
}

pub fn clamp_trend(value: f64) -> f64 {
    value.clamp(TREND_MIN, TREND_MAX)
}

pub fn market_shift(prev: &GameState, day: u32, rng: &mut impl Rng) -> Option<MarketShift> {
    if !crate::roll(rng, MARKET_SHIFT_CHANCE) {
        return None;
    }
    let category = *HardwareType::ALL.choose(rng)?;
    let delta = rng.gen_range(-MARKET_SHIFT_MAX..=MARKET_SHIFT_MAX);
    let multiplier = clamp_trend(prev.market.trend(category) + delta);
    let news = (delta.abs() > NEWS_THRESHOLD).then(|| {
        let direction = if delta > 0.0 {
            TrendDirection::Inflation
        } else {
            TrendDirection::Deflation
        };
        NewsItem {
            day,
            category,
            direction,
            headline: headline(category, direction, rng),
        }
    });
    Some(MarketShift {
        category,
        multiplier,
        delta,
        news,
    })
}

fn headline(category: HardwareType, direction: TrendDirection, rng: &mut impl Rng) -> String {
    const INFLATION: [&str; 3] = [
        "{} shortage hits resellers as fabs stall",
        "Crypto farms bid up {} stock overnight",
        "Tariff rumours push {} prices higher",
    ];
    const DEFLATION: [&str; 3] = [
        "{} glut: warehouses dump old stock",
        "New process node makes last-gen {} cheap",
        "{} demand collapses after botnet takedown",
    ];
    let templates = match direction {
        TrendDirection::Inflation => &INFLATION,
        TrendDirection::Deflation => &DEFLATION,
    };
    let template = templates.choose(rng).copied().unwrap_or("{} market moves");
    template.replacen("{}", category.label(), 1)
}

/// Opens a signal window unless a signal or shadow access is already live.
pub fn signal(prev: &GameState, now_ms: u64, rng: &mut impl Rng) -> Option<SignalWindow> {
    let hit = crate::roll(rng, SIGNAL_CHANCE);
    if !hit || prev.inbox.signal_active(now_ms) || prev.inbox.shadow_access_active(now_ms) {
        return None;
    }
    Some(SignalWindow {
        opened_at_ms: now_ms,
        expires_at_ms: now_ms + SIGNAL_WINDOW_MS,
    })
}

/// Email kind for the given reputation and trace. `pick` is a uniform draw
/// in `0..1` used to split between the biased kinds.
pub fn email_kind(reputation: i64, trace: f64, pick: f64) -> EmailKind {
    let job = reputation > JOB_REPUTATION;
    let threat = trace > THREAT_TRACE;
    match (job, threat) {
        (true, true) => {
            if pick < 0.5 {
                EmailKind::Job
            } else {
                EmailKind::Threat
            }
        }
        (true, false) => {
            if pick < 0.7 {
                EmailKind::Job
            } else {
                EmailKind::Spam
            }
        }
        (false, true) => {
            if pick < 0.7 {
                EmailKind::Threat
            } else {
                EmailKind::Spam
            }
        }
        (false, false) => EmailKind::Spam,
    }
}

pub fn email(prev: &GameState, day: u32, rng: &mut impl Rng) -> Option<Email> {
    if !crate::roll(rng, EMAIL_CHANCE) {
        return None;
    }
    let kind = email_kind(prev.player.reputation, prev.risk.trace_percent, rng.gen());
    let (sender, subject, body) = match kind {
        EmailKind::Job => (
            "recruiting@nexus-dynamics.corp",
            "Contract opportunity",
            "Your commits have been noticed. We pay well for discreet talent.",
        ),
        EmailKind::Threat => (
            "unknown@0.0.0.0",
            "We see you",
            "Your trace is loud. Go dark or we sell your handle.",
        ),
        EmailKind::Spam => (
            "deals@overclockd.biz",
            "50% off thermal paste!!!",
            "Limited time. Your rig deserves better.",
        ),
    };
    Some(Email {
        id: EmailId(format!("mail_{:04}", prev.counters.next_email_id)),
        kind,
        sender: sender.to_string(),
        subject: subject.to_string(),
        body: body.to_string(),
        day,
        read: false,
    })
}

pub(crate) fn push_news(news: &mut Vec<NewsItem>, item: NewsItem) {
    news.push(item);
    if news.len() > NEWS_CAP {
        let excess = news.len() - NEWS_CAP;
        news.drain(..excess);
    }
}

pub(crate) fn push_email(emails: &mut Vec<Email>, email: Email) {
    emails.push(email);
    if emails.len() > EMAIL_CAP {
        let excess = emails.len() - EMAIL_CAP;
        emails.drain(..excess);
    }
}

/// Drop time boxes that end further past `now_ms` than a freshly opened one
/// could. Saves written against a different clock (wall time versus
/// simulated time) would otherwise keep them open indefinitely. Returns
/// true when anything was cleared.
pub fn drop_foreign_time_boxes(
    state: &mut GameState,
    now_ms: u64,
    shadow_access_secs: u64,
) -> bool {
    let inbox = &mut state.inbox;
    let mut cleared = false;
    if inbox
        .signal
        .as_ref()
        .is_some_and(|s| s.expires_at_ms > now_ms.saturating_add(SIGNAL_WINDOW_MS))
    {
        inbox.signal = None;
        cleared = true;
    }
    let longest_access = now_ms.saturating_add(shadow_access_secs.saturating_mul(1000));
    if inbox.shadow_access_until_ms.is_some_and(|until| until > longest_access) {
        inbox.shadow_access_until_ms = None;
        cleared = true;
    }
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn time_boxes_from_another_clock_are_dropped() {
        let mut state = GameState::default();
        let wall_clock = 1_700_000_000_000;
        state.inbox.signal = Some(SignalWindow {
            opened_at_ms: wall_clock,
            expires_at_ms: wall_clock + SIGNAL_WINDOW_MS,
        });
        state.inbox.shadow_access_until_ms = Some(wall_clock + 300_000);
        assert!(drop_foreign_time_boxes(&mut state, 60_000, 300));
        assert!(state.inbox.signal.is_none());
        assert!(state.inbox.shadow_access_until_ms.is_none());

        state.inbox.shadow_access_until_ms = Some(100_000);
        assert!(!drop_foreign_time_boxes(&mut state, 60_000, 300));
        assert_eq!(state.inbox.shadow_access_until_ms, Some(100_000));
    }

    #[test]
    fn no_shift_when_roll_misses() {
        let state = GameState::default();
        let mut never = StepRng::new(u64::MAX, 0);
        assert!(market_shift(&state, 1, &mut never).is_none());
    }

    #[test]
    fn shift_is_clamped_to_trend_bounds() {
        let mut state = GameState::default();
        for trend in state.market.trends.values_mut() {
            *trend = TREND_MIN;
        }
        // All-zero draws pick the first category and the most negative delta.
        let mut zeros = StepRng::new(0, 0);
        let shift = market_shift(&state, 1, &mut zeros).expect("roll hits");
        assert_eq!(shift.category, HardwareType::Cpu);
        assert!((shift.delta + MARKET_SHIFT_MAX).abs() < 1e-12);
        assert!((shift.multiplier - TREND_MIN).abs() < 1e-12);
        let news = shift.news.expect("large shift makes news");
        assert_eq!(news.direction, TrendDirection::Deflation);
        assert!(news.headline.contains("CPU"));
    }

    #[test]
    fn signal_not_opened_while_shadow_access_live() {
        let mut state = GameState::default();
        let mut always = StepRng::new(0, 0);
        assert!(signal(&state, 1_000, &mut always).is_some());

        state.inbox.shadow_access_until_ms = Some(5_000);
        assert!(signal(&state, 1_000, &mut always).is_none());
        // Expired access no longer blocks.
        assert!(signal(&state, 5_000, &mut always).is_some());
    }

    #[test]
    fn signal_window_is_ninety_seconds() {
        let state = GameState::default();
        let mut always = StepRng::new(0, 0);
        let window = signal(&state, 10_000, &mut always).expect("opens");
        assert_eq!(window.expires_at_ms, 100_000);
    }

    #[test]
    fn email_kind_is_biased_by_reputation_and_trace() {
        assert_eq!(email_kind(0, 0.0, 0.0), EmailKind::Spam);
        assert_eq!(email_kind(501, 0.0, 0.1), EmailKind::Job);
        assert_eq!(email_kind(501, 0.0, 0.9), EmailKind::Spam);
        assert_eq!(email_kind(0, 25.0, 0.1), EmailKind::Threat);
        assert_eq!(email_kind(500, 20.0, 0.1), EmailKind::Spam);
    }

    #[test]
    fn news_is_capped_to_most_recent() {
        let mut news = Vec::new();
        for day in 0..30 {
            push_news(
                &mut news,
                NewsItem {
                    day,
                    category: HardwareType::Gpu,
                    direction: TrendDirection::Inflation,
                    headline: String::new(),
                },
            );
        }
        assert_eq!(news.len(), NEWS_CAP);
        assert_eq!(news[0].day, 10);
    }
}
