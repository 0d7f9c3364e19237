//! Colour and intensity tables for every season and time of day.

use foundation::color::Rgb;
use foundation::math::Vec3;

use crate::season::Season;

/// Seconds for background, ground and light transitions.
pub const COLOR_TRANSITION_S: f64 = 1.5;
/// Seconds for the window glow transition.
pub const GLOW_TRANSITION_S: f64 = 1.0;

pub const WOOD: Rgb = Rgb::from_hex(0x8b4513);
pub const SNOW_COVER: Rgb = Rgb::from_hex(0xe8e8e8);
pub const STONE: Rgb = Rgb::from_hex(0x808080);
pub const WINDOW_GLOW: Rgb = Rgb::from_hex(0xffd700);

pub const WOOD_ROUGHNESS: f32 = 0.9;
pub const RAILING_ROUGHNESS: f32 = 0.75;
pub const STONE_ROUGHNESS: f32 = 0.9;
pub const SNOW_ROUGHNESS: f32 = 0.7;
/// Horizontal railing scale while snow-covered.
pub const SNOW_RAILING_SCALE: f64 = 1.05;

pub const WINDOW_GLOW_INTENSITY: f32 = 0.8;
pub const SMOKE_OPACITY: f32 = 0.8;
pub const SMOKE_POINT_SIZE: f32 = 0.6;

pub fn sky_color(season: Season, is_night: bool) -> Rgb {
    let hex = match (season, is_night) {
        (Season::Spring, false) => 0x87ceeb,
        (Season::Spring, true) => 0x0c1445,
        (Season::Summer, false) => 0x87ceeb,
        (Season::Summer, true) => 0x000020,
        (Season::Autumn, false) => 0xe9967a,
        (Season::Autumn, true) => 0x12203c,
        (Season::Winter, false) => 0xe0ffff,
        (Season::Winter, true) => 0x051938,
    };
    Rgb::from_hex(hex)
}

pub fn ground_color(season: Season) -> Rgb {
    Rgb::from_hex(match season {
        Season::Spring => 0x7cbb69,
        Season::Summer => 0x2e8b57,
        Season::Autumn => 0xcd853f,
        Season::Winter => 0xd3d3d3,
    })
}

/// UI accent colour per season.
pub fn accent_color(season: Season) -> Rgb {
    Rgb::from_hex(match season {
        Season::Spring => 0xf8c3cd,
        Season::Summer => 0x1eb980,
        Season::Autumn => 0xe08e45,
        Season::Winter => 0xd4f1f9,
    })
}

pub fn light_color(season: Season) -> Rgb {
    Rgb::from_hex(match season {
        Season::Spring => 0xffe6e6,
        Season::Summer => 0xffffcc,
        Season::Autumn => 0xffd6a5,
        Season::Winter => 0xe6f0ff,
    })
}

pub fn light_position(season: Season) -> Vec3 {
    match season {
        Season::Spring => Vec3::new(5.0, 10.0, 5.0),
        Season::Summer => Vec3::new(0.0, 15.0, 0.0),
        Season::Autumn => Vec3::new(-5.0, 10.0, 5.0),
        Season::Winter => Vec3::new(0.0, 10.0, 10.0),
    }
}

/// Intensity of a seasonal light: the active season's light is full by day
/// and dimmed at night, every other seasonal light is off.
pub fn seasonal_light_intensity(light_season: Season, state_season: Season, is_night: bool) -> f32 {
    if light_season != state_season {
        0.0
    } else if is_night {
        0.3
    } else {
        1.0
    }
}

pub fn ambient_intensity(is_night: bool) -> f32 {
    if is_night { 0.2 } else { 0.4 }
}

pub fn window_emissive(is_night: bool) -> (Rgb, f32) {
    if is_night {
        (WINDOW_GLOW, WINDOW_GLOW_INTENSITY)
    } else {
        (Rgb::BLACK, 0.0)
    }
}

/// Candidate flower colours; winter has none because flowers are hidden.
pub fn flower_palette(season: Season) -> &'static [u32] {
    match season {
        Season::Spring => &[0xffb6c1, 0xffff00],
        Season::Summer => &[0xff0000, 0xffff00, 0xff00ff, 0x00ff00, 0x0000ff],
        Season::Autumn => &[0xffa500, 0x8b4513],
        Season::Winter => &[],
    }
}

pub fn grass_color(season: Season) -> Option<Rgb> {
    match season {
        Season::Spring => Some(Rgb::from_hex(0x7ccd7c)),
        Season::Summer => Some(Rgb::from_hex(0x4ca64c)),
        Season::Autumn => Some(Rgb::from_hex(0xd2b48c)),
        Season::Winter => None,
    }
}

/// Picks a flower colour for decoration `index` in `season`.
///
/// The choice is a pure function of its inputs so re-applying a season
/// reproduces the same colours.
pub fn flower_color(season: Season, index: u32) -> Option<Rgb> {
    let palette = flower_palette(season);
    if palette.is_empty() {
        return None;
    }
    let h = mix32(index.wrapping_mul(4) ^ season.index() as u32);
    Some(Rgb::from_hex(palette[(h as usize) % palette.len()]))
}

fn mix32(x_in: u32) -> u32 {
    let mut x = x_in;
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb_352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846c_a68b);
    x ^= x >> 16;
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn night_sky_is_darker_than_day() {
        for s in Season::ALL {
            let day = sky_color(s, false);
            let night = sky_color(s, true);
            assert!(night.r + night.g + night.b < day.r + day.g + day.b);
        }
    }

    #[test]
    fn only_the_active_light_is_lit() {
        assert_eq!(seasonal_light_intensity(Season::Winter, Season::Winter, true), 0.3);
        assert_eq!(seasonal_light_intensity(Season::Winter, Season::Winter, false), 1.0);
        assert_eq!(seasonal_light_intensity(Season::Spring, Season::Winter, false), 0.0);
    }

    #[test]
    fn flower_colours_are_stable_and_from_palette() {
        for s in [Season::Spring, Season::Summer, Season::Autumn] {
            for i in 0..20 {
                let a = flower_color(s, i).unwrap();
                assert_eq!(Some(a), flower_color(s, i));
                assert!(flower_palette(s).contains(&a.to_hex()));
            }
        }
        assert_eq!(flower_color(Season::Winter, 3), None);
        assert_eq!(grass_color(Season::Winter), None);
    }

    #[test]
    fn window_glow_follows_night() {
        assert_eq!(window_emissive(true), (WINDOW_GLOW, 0.8));
        assert_eq!(window_emissive(false), (Rgb::BLACK, 0.0));
    }
}
