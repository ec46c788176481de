//! Animated background: a vertical gradient with a condition-keyed
//! particle field (rain streaks, drifting clouds or twinkling points).
//!
//! Particles live in unit space and are mapped onto the terminal area at
//! render time, so resizes need no special handling. The field is reseeded
//! whenever the scene changes.

use std::time::Instant;

use rand::Rng;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};
use skycast_core::{ParticleKind, Rgb, Scene};

const RAIN_DROPS: usize = 80;
const FAR_CLOUDS: usize = 4;
const NEAR_CLOUDS: usize = 3;
const STARS: usize = 30;

/// Upper bound on one animation step, so a stalled frame cannot teleport
/// the particles.
const MAX_STEP_SECS: f32 = 0.1;

#[derive(Debug, Clone, Copy)]
struct Particle {
    x: f32,
    y: f32,
    speed: f32,
    phase: f32,
}

#[derive(Debug)]
pub struct Backdrop {
    scene: Scene,
    particles: Vec<Particle>,
    last_step: Option<Instant>,
    elapsed: f32,
}

impl Backdrop {
    pub fn new() -> Self {
        let mut backdrop = Self {
            scene: Scene::default(),
            particles: Vec::new(),
            last_step: None,
            elapsed: 0.0,
        };
        backdrop.seed_particles(&mut rand::rng());
        backdrop
    }

    /// Adopt `scene` (reseeding the particle field if it changed) and step
    /// the animation up to `now`.
    pub fn sync(&mut self, scene: Scene, now: Instant) {
        if scene != self.scene {
            self.scene = scene;
            self.seed_particles(&mut rand::rng());
        }
        self.advance(now);
    }

    fn seed_particles(&mut self, rng: &mut impl Rng) {
        self.particles.clear();

        match self.scene.particles {
            ParticleKind::Rain => {
                for _ in 0..RAIN_DROPS {
                    self.particles.push(Particle {
                        x: rng.random::<f32>(),
                        y: rng.random::<f32>(),
                        speed: rng.random_range(0.6..1.2),
                        phase: 0.0,
                    });
                }
            }
            ParticleKind::Clouds => {
                for _ in 0..FAR_CLOUDS {
                    self.particles.push(Particle {
                        x: rng.random::<f32>(),
                        y: rng.random_range(0.05..0.45),
                        speed: rng.random_range(0.02..0.05),
                        phase: 0.0,
                    });
                }
                for _ in 0..NEAR_CLOUDS {
                    self.particles.push(Particle {
                        x: rng.random::<f32>(),
                        y: rng.random_range(0.1..0.6),
                        speed: rng.random_range(0.05..0.09),
                        phase: 0.0,
                    });
                }
            }
            ParticleKind::Stars => {
                for _ in 0..STARS {
                    self.particles.push(Particle {
                        x: rng.random::<f32>(),
                        y: rng.random_range(0.0..0.85),
                        speed: rng.random_range(1.5..4.0),
                        phase: rng.random_range(0.0..std::f32::consts::TAU),
                    });
                }
            }
            ParticleKind::None => {}
        }
    }

    fn advance(&mut self, now: Instant) {
        let dt = match self.last_step {
            Some(prev) => now.duration_since(prev).as_secs_f32().min(MAX_STEP_SECS),
            None => 0.0,
        };
        self.last_step = Some(now);
        self.elapsed += dt;

        match self.scene.particles {
            ParticleKind::Rain => {
                for p in &mut self.particles {
                    p.y += p.speed * dt;
                    if p.y >= 1.0 {
                        p.y -= 1.0;
                    }
                }
            }
            ParticleKind::Clouds => {
                for p in &mut self.particles {
                    p.x += p.speed * dt;
                    if p.x >= 1.0 {
                        p.x -= 1.0;
                    }
                }
            }
            // Stars twinkle in place off `elapsed`.
            ParticleKind::Stars | ParticleKind::None => {}
        }
    }

    fn render_gradient(&self, area: Rect, buf: &mut Buffer) {
        let (top, bottom) = self.scene.gradient.stops();
        let denom = area.height.saturating_sub(1).max(1) as f32;

        for row in 0..area.height {
            let t = row as f32 / denom;
            let color = lerp_rgb(top, bottom, t);
            for col in 0..area.width {
                buf.get_mut(area.x + col, area.y + row).set_bg(color);
            }
        }
    }

    fn render_particles(&self, area: Rect, buf: &mut Buffer) {
        match self.scene.particles {
            ParticleKind::Rain => {
                let style = Style::default().fg(Color::Rgb(0x94, 0xa3, 0xb8));
                for p in &self.particles {
                    let (x, y) = project(p, area);
                    buf.get_mut(x, y).set_symbol("│").set_style(style);
                }
            }
            ParticleKind::Clouds => {
                let far = Style::default().fg(Color::Rgb(0x9c, 0xa3, 0xaf));
                let near = Style::default().fg(Color::Rgb(0xf9, 0xfa, 0xfb));
                for (i, p) in self.particles.iter().enumerate() {
                    let (x, y) = project(p, area);
                    let room = area.right().saturating_sub(x) as usize;
                    if i < FAR_CLOUDS {
                        buf.set_stringn(x, y, "▒▒▒▒", room, far);
                    } else {
                        buf.set_stringn(x, y, "▓▓▓▓▓", room, near);
                    }
                }
            }
            ParticleKind::Stars => {
                let bright = Style::default().fg(Color::Rgb(0xfe, 0xf9, 0xc3));
                let dim = Style::default().fg(Color::Rgb(0xe0, 0xf2, 0xfe));
                for p in &self.particles {
                    let (x, y) = project(p, area);
                    let lit = (p.phase + self.elapsed * p.speed).sin() > 0.0;
                    let cell = buf.get_mut(x, y);
                    if lit {
                        cell.set_symbol("✦").set_style(bright);
                    } else {
                        cell.set_symbol("·").set_style(dim);
                    }
                }
            }
            ParticleKind::None => {}
        }
    }
}

impl Default for Backdrop {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &Backdrop {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        self.render_gradient(area, buf);
        self.render_particles(area, buf);
    }
}

/// Map a unit-space particle onto cell coordinates inside `area`.
fn project(p: &Particle, area: Rect) -> (u16, u16) {
    let x = area.x + ((p.x * area.width as f32) as u16).min(area.width.saturating_sub(1));
    let y = area.y + ((p.y * area.height as f32) as u16).min(area.height.saturating_sub(1));
    (x, y)
}

fn lerp_rgb(a: Rgb, b: Rgb, t: f32) -> Color {
    let mix = |lo: u8, hi: u8| -> u8 {
        (lo as f32 + (hi as f32 - lo as f32) * t).round().clamp(0.0, 255.0) as u8
    };
    Color::Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use skycast_core::GradientToken;
    use std::time::Duration;

    fn rain_scene() -> Scene {
        Scene::for_condition("Rain")
    }

    fn clouds_scene() -> Scene {
        Scene::for_condition("Clouds")
    }

    #[test]
    fn scene_change_reseeds_the_field() {
        let t0 = Instant::now();
        let mut backdrop = Backdrop::new();
        assert!(backdrop.particles.is_empty(), "default scene has no particles");

        backdrop.sync(rain_scene(), t0);
        assert_eq!(backdrop.particles.len(), RAIN_DROPS);

        backdrop.sync(clouds_scene(), t0);
        assert_eq!(backdrop.particles.len(), FAR_CLOUDS + NEAR_CLOUDS);
    }

    #[test]
    fn unchanged_scene_keeps_the_field() {
        let t0 = Instant::now();
        let mut backdrop = Backdrop::new();
        backdrop.sync(rain_scene(), t0);

        let before: Vec<f32> = backdrop.particles.iter().map(|p| p.x).collect();
        backdrop.sync(rain_scene(), t0);
        let after: Vec<f32> = backdrop.particles.iter().map(|p| p.x).collect();

        assert_eq!(before, after);
    }

    #[test]
    fn rain_falls_and_wraps() {
        let t0 = Instant::now();
        let mut backdrop = Backdrop::new();
        backdrop.sync(rain_scene(), t0);

        backdrop.particles[0] = Particle {
            x: 0.5,
            y: 0.95,
            speed: 1.0,
            phase: 0.0,
        };

        // Steps are capped at MAX_STEP_SECS, so walk in small increments.
        let mut now = t0;
        for _ in 0..2 {
            now += Duration::from_millis(50);
            backdrop.sync(rain_scene(), now);
        }

        let p = backdrop.particles[0];
        assert!(p.y < 0.95, "drop wrapped back to the top, got {}", p.y);
    }

    #[test]
    fn projection_stays_inside_the_area() {
        let area = Rect::new(2, 3, 10, 5);
        let p = Particle {
            x: 0.999,
            y: 0.999,
            speed: 0.0,
            phase: 0.0,
        };
        let (x, y) = project(&p, area);
        assert!(x < area.right());
        assert!(y < area.bottom());
    }

    #[test]
    fn gradient_ramps_between_the_scene_stops() {
        let t0 = Instant::now();
        let mut backdrop = Backdrop::new();
        backdrop.sync(Scene::for_condition("Clear"), t0);
        assert_eq!(backdrop.scene.gradient, GradientToken::Azure);

        let area = Rect::new(0, 0, 4, 4);
        let mut buf = Buffer::empty(area);
        (&backdrop).render(area, &mut buf);

        let (top, bottom) = GradientToken::Azure.stops();
        assert_eq!(buf.get(0, 0).bg, Color::Rgb(top.0, top.1, top.2));
        assert_eq!(buf.get(3, 3).bg, Color::Rgb(bottom.0, bottom.1, bottom.2));
    }
}
