use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notification::NOTIFICATION_HISTORY_DAYS;
use crate::reminder::DEFAULT_RING_TONE;

#[derive(Deserialize, Debug)]
pub struct StorageSettings {
    pub database_url: String,
}

#[derive(Deserialize, Debug)]
pub struct ScheduleSettings {
    pub timezone: String,
    #[serde(default = "default_history_days")]
    pub history_days: i64,
}

#[derive(Deserialize, Debug)]
pub struct Settings {
    pub storage: StorageSettings,
    pub schedule: ScheduleSettings,
}

fn default_history_days() -> i64 {
    NOTIFICATION_HISTORY_DAYS
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Unknown timezone {0}")]
    UnknownTimezone(String),
}

impl ScheduleSettings {
    pub fn timezone(&self) -> Result<chrono_tz::Tz, SettingsError> {
        self.timezone
            .parse()
            .map_err(|_| SettingsError::UnknownTimezone(self.timezone.clone()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VibrationPattern {
    #[default]
    Default,
    Gentle,
    Strong,
    Pulse,
    None,
}

impl VibrationPattern {
    pub fn timings(&self) -> &'static [u64] {
        match self {
            VibrationPattern::Default => &[0, 250, 250, 250],
            VibrationPattern::Gentle => &[0, 100, 200, 100],
            VibrationPattern::Strong => &[0, 500, 200, 500],
            VibrationPattern::Pulse => &[0, 100, 100, 100, 100, 100],
            VibrationPattern::None => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub notifications_enabled: bool,
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
    pub default_ringtone: String,
    pub notification_duration: u64,
    pub snooze_time: i64,
    pub vibration_pattern: VibrationPattern,
    pub silent_mode: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            sound_enabled: true,
            vibration_enabled: true,
            default_ringtone: DEFAULT_RING_TONE.to_string(),
            notification_duration: 30,
            snooze_time: 10,
            vibration_pattern: VibrationPattern::Default,
            silent_mode: false,
        }
    }
}

impl NotificationSettings {
    pub fn should_play_sound(&self) -> bool {
        self.sound_enabled && !self.silent_mode
    }

    pub fn sound_for(&self, ring_tone: &str) -> Option<String> {
        self.should_play_sound().then(|| ring_tone.to_string())
    }

    pub fn channel_hint(&self, ring_tone: &str) -> String {
        if self.should_play_sound() && ring_tone != DEFAULT_RING_TONE {
            format!("reminder-{}", ring_tone)
        } else {
            DEFAULT_RING_TONE.to_string()
        }
    }

    pub fn vibration(&self) -> Vec<u64> {
        if self.vibration_enabled {
            self.vibration_pattern.timings().to_vec()
        } else {
            Vec::new()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.notification_duration > 0).then(|| Duration::from_secs(self.notification_duration))
    }

    pub fn snooze_minutes(&self) -> i64 {
        self.snooze_time.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sound_respects_silent_mode() {
        let mut settings = NotificationSettings::default();
        assert_eq!(settings.sound_for("calm"), Some("calm".to_string()));
        assert_eq!(settings.channel_hint("calm"), "reminder-calm");
        assert_eq!(settings.channel_hint("default"), "default");

        settings.silent_mode = true;
        assert_eq!(settings.sound_for("calm"), None);
        assert_eq!(settings.channel_hint("calm"), "default");
    }

    #[test]
    fn vibration_follows_pattern_and_switch() {
        let mut settings = NotificationSettings {
            vibration_pattern: VibrationPattern::Pulse,
            ..Default::default()
        };
        assert_eq!(settings.vibration(), vec![0, 100, 100, 100, 100, 100]);

        settings.vibration_enabled = false;
        assert!(settings.vibration().is_empty());
    }

    #[test]
    fn unknown_timezone_is_reported() {
        let schedule = ScheduleSettings {
            timezone: "Mars/Olympus".to_string(),
            history_days: 15,
        };
        assert!(matches!(
            schedule.timezone(),
            Err(SettingsError::UnknownTimezone(_))
        ));

        let schedule = ScheduleSettings {
            timezone: "Europe/Berlin".to_string(),
            history_days: 15,
        };
        assert_eq!(schedule.timezone().unwrap(), chrono_tz::Europe::Berlin);
    }
}
