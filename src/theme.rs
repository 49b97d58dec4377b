use crate::graphics::Rgba;
use clap::ValueEnum;
use std::fmt;

/// Visual theme of the particle field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Everything that differs between themes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThemeConfig {
    /// Number of particles created on initialization
    pub particle_count: usize,
    /// Colours a particle may be assigned at creation
    pub palette: [Rgba; 4],
    /// Particles closer than this are linked by a line
    pub connection_distance: f64,
    /// Alpha of a connecting line of zero length
    pub line_opacity: f64,
    pub line_color: Rgba,
    pub line_width: f64,
    /// Opacity of the whole drawing surface over the background
    pub surface_opacity: f64,
    pub background: Rgba,
    /// Colour of overlay text
    pub foreground: Rgba,
}

static LIGHT: ThemeConfig = ThemeConfig {
    particle_count: 80,
    palette: [
        Rgba::new(0, 150, 215, 0.4),
        Rgba::new(104, 159, 56, 0.4),
        Rgba::new(242, 142, 28, 0.4),
        Rgba::new(41, 121, 255, 0.4),
    ],
    connection_distance: 120.0,
    line_opacity: 0.3,
    line_color: Rgba::new(100, 149, 237, 1.0),
    line_width: 0.6,
    surface_opacity: 0.7,
    background: Rgba::new(245, 247, 250, 1.0),
    foreground: Rgba::new(33, 37, 41, 1.0),
};

static DARK: ThemeConfig = ThemeConfig {
    particle_count: 70,
    palette: [
        Rgba::new(102, 51, 153, 0.6),
        Rgba::new(35, 78, 160, 0.5),
        Rgba::new(15, 120, 87, 0.5),
        Rgba::new(207, 100, 0, 0.5),
    ],
    connection_distance: 100.0,
    line_opacity: 0.5,
    line_color: Rgba::new(90, 90, 120, 1.0),
    line_width: 0.8,
    surface_opacity: 0.8,
    background: Rgba::new(18, 18, 18, 1.0),
    foreground: Rgba::new(230, 230, 230, 1.0),
};

impl Theme {
    pub fn config(self) -> &'static ThemeConfig {
        match self {
            Theme::Light => &LIGHT,
            Theme::Dark => &DARK,
        }
    }

    /// The other theme
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}
