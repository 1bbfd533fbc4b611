use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Abstraction over "current time" to make behavior deterministic in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The calendar day "today" falls on for this clock.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Which zone decides the calendar day.
#[derive(Debug, Clone, Default)]
pub enum ZoneSpec {
    #[default]
    Local,
    Named(Tz),
}

impl ZoneSpec {
    /// Parse `local`/`current`, `utc`, or an IANA zone name.
    pub fn parse(s: Option<&str>) -> Result<Self> {
        let Some(s) = s else {
            return Ok(ZoneSpec::Local);
        };
        let trimmed = s.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("local")
            || trimmed.eq_ignore_ascii_case("current")
        {
            return Ok(ZoneSpec::Local);
        }
        if trimmed.eq_ignore_ascii_case("utc") {
            return Ok(ZoneSpec::Named(chrono_tz::UTC));
        }
        let tz: Tz = trimmed.parse().with_context(|| {
            format!("Invalid timezone '{trimmed}' (expected IANA name, e.g. Asia/Seoul)")
        })?;
        Ok(ZoneSpec::Named(tz))
    }

    pub fn label(&self) -> String {
        match self {
            ZoneSpec::Local => "local".to_string(),
            ZoneSpec::Named(tz) => tz.name().to_string(),
        }
    }

    pub fn date_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        match self {
            ZoneSpec::Local => ts.with_timezone(&chrono::Local).date_naive(),
            ZoneSpec::Named(tz) => ts.with_timezone(tz).date_naive(),
        }
    }
}

/// Wall clock. "Today" is taken in the configured zone (local by default).
#[derive(Debug, Clone, Default)]
pub struct SystemClock {
    zone: ZoneSpec,
}

impl SystemClock {
    pub fn in_zone(zone: ZoneSpec) -> Self {
        Self { zone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        self.zone.date_of(self.now())
    }
}

#[derive(Debug, Clone)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// A clock pinned to noon UTC on `date`.
    pub fn on(date: NaiveDate) -> Self {
        let noon = date
            .and_hms_opt(12, 0, 0)
            .expect("noon is a valid time of day");
        Self::new(Utc.from_utc_datetime(&noon))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
