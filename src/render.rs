/// Scene drawing through an abstract canvas.
///
/// `draw` receives an immutable view of the match and issues primitive draw
/// calls.  No game logic is performed and nothing is read back from the
/// canvas; the platform decides how a rectangle or a line becomes pixels or
/// terminal cells.

use crate::combatant::{Combatant, CombatantKind};
use crate::entities::{GameStatus, MatchState};
use crate::geometry::{Color, Ellipse, Rect, Vec2};
use crate::projectile::Projectile;
use crate::upgrade::{card_rects, Upgrade};

/// Primitive draw operations.  All geometry is in playfield units (y-up).
pub trait Canvas {
    fn fill_rect(&mut self, rect: &Rect, color: Color);
    fn stroke_rect(&mut self, rect: &Rect, color: Color);
    fn fill_ellipse(&mut self, ellipse: &Ellipse, color: Color);
    fn stroke_ellipse(&mut self, ellipse: &Ellipse, color: Color);
    fn fill_polygon(&mut self, vertices: &[Vec2], color: Color);
    fn line(&mut self, from: Vec2, to: Vec2, color: Color);
    fn point(&mut self, at: Vec2, color: Color);
    /// `at` is the left end of the baseline.
    fn text(&mut self, at: Vec2, text: &str, color: Color);
}

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BACKGROUND: Color = Color::rgb(0.05, 0.05, 0.08);
const C_RANGE: Color = Color::rgba(0.3, 0.6, 1.0, 0.5);
const C_TOWER: Color = Color::rgb(0.35, 0.55, 0.95);
const C_TOWER_OUTLINE: Color = Color::WHITE;
const C_MELEE: Color = Color::rgb(0.9, 0.25, 0.25);
const C_RANGED: Color = Color::rgb(0.25, 0.85, 0.35);
const C_RANGED_RING: Color = Color::rgba(0.25, 0.85, 0.35, 0.3);
const C_BOSS: Color = Color::rgb(0.7, 0.2, 0.85);
const C_CROWN: Color = Color::rgb(1.0, 0.84, 0.0);
const C_BAR_BACK: Color = Color::rgb(0.3, 0.0, 0.0);
const C_BAR_FRONT: Color = Color::rgb(0.1, 0.9, 0.2);
const C_SHOT_TOWER: Color = Color::rgb(0.4, 0.9, 1.0);
const C_SHOT_ENEMY: Color = Color::rgb(1.0, 0.45, 0.2);
const C_HUD: Color = Color::rgb(0.95, 0.9, 0.4);
const C_HUD_DIM: Color = Color::rgb(0.6, 0.6, 0.6);
const C_BANNER: Color = Color::rgb(1.0, 0.3, 0.3);
const C_OVERLAY: Color = Color::rgba(0.0, 0.0, 0.0, 0.6);
const C_CARD: Color = Color::rgb(0.12, 0.12, 0.2);
const C_CARD_FRAME: Color = Color::rgb(0.5, 0.5, 0.6);
const C_CARD_SELECTED: Color = Color::rgb(1.0, 0.84, 0.0);

/// Nominal glyph advance, used to centre and wrap text.
pub const GLYPH_WIDTH: f32 = 8.0;
const LINE_HEIGHT: f32 = 18.0;
const HEALTH_BAR_HEIGHT: f32 = 4.0;

// ── Public entry point ────────────────────────────────────────────────────────

/// Draw one complete frame.
pub fn draw<C: Canvas + ?Sized>(state: &MatchState, canvas: &mut C) {
    canvas.fill_rect(&state.arena, C_BACKGROUND);

    draw_tower(canvas, state);
    for c in state.combatants.iter().filter(|c| c.is_alive()) {
        draw_combatant(canvas, c);
    }
    draw_projectiles(canvas, state);
    draw_hud(canvas, state);

    match state.status {
        GameStatus::Playing => {}
        GameStatus::UpgradeMenu => draw_upgrade_menu(canvas, state),
        GameStatus::GameOver => draw_game_over(canvas, state),
    }
}

// ── Scene ─────────────────────────────────────────────────────────────────────

fn draw_tower<C: Canvas + ?Sized>(canvas: &mut C, state: &MatchState) {
    let tower = &state.tower;
    canvas.stroke_ellipse(&Ellipse::circle(tower.center(), tower.range), C_RANGE);
    canvas.fill_rect(&tower.rect, C_TOWER);
    canvas.stroke_rect(&tower.rect, C_TOWER_OUTLINE);
}

fn draw_combatant<C: Canvas + ?Sized>(canvas: &mut C, c: &Combatant) {
    let color = match &c.kind {
        CombatantKind::Melee(_) => C_MELEE,
        CombatantKind::Ranged(ranged) => {
            canvas.stroke_ellipse(&Ellipse::circle(c.center(), ranged.attack_range), C_RANGED_RING);
            C_RANGED
        }
        CombatantKind::Boss(_) => C_BOSS,
    };
    canvas.fill_ellipse(&c.shape, color);
    if let CombatantKind::Boss(_) = c.kind {
        canvas.fill_polygon(&crown_polygon(&c.shape), C_CROWN);
    }

    let top = c.shape.center.y + c.shape.radius_y;
    let width = c.shape.radius_x * 2.0;
    let bar = Rect::new(c.shape.center.x - width / 2.0, top + 4.0, width, HEALTH_BAR_HEIGHT);
    draw_health_bar(canvas, &bar, c.health, c.max_health);
}

/// Five-pointed crown sitting on top of a boss body.
pub fn crown_polygon(body: &Ellipse) -> Vec<Vec2> {
    let Vec2 { x: cx, y: cy } = body.center;
    let w = body.radius_x * 0.6;
    let h = body.radius_y * 0.5;
    let base = cy + body.radius_y * 0.6;
    vec![
        Vec2::new(cx - w, base),
        Vec2::new(cx + w, base),
        Vec2::new(cx + w, base + h),
        Vec2::new(cx + w * 0.5, base + h * 0.5),
        Vec2::new(cx, base + h),
        Vec2::new(cx - w * 0.5, base + h * 0.5),
        Vec2::new(cx - w, base + h),
    ]
}

fn draw_health_bar<C: Canvas + ?Sized>(canvas: &mut C, bar: &Rect, health: i32, max_health: i32) {
    let ratio = if max_health > 0 {
        (health as f32 / max_health as f32).clamp(0.0, 1.0)
    } else {
        0.0
    };
    canvas.fill_rect(bar, C_BAR_BACK);
    if ratio > 0.0 {
        canvas.fill_rect(&Rect::new(bar.left, bar.bottom, bar.width * ratio, bar.height), C_BAR_FRONT);
    }
}

fn draw_projectiles<C: Canvas + ?Sized>(canvas: &mut C, state: &MatchState) {
    let shots = |ps: &[Projectile]| ps.iter().filter(|p| p.is_active()).map(|p| p.position).collect::<Vec<_>>();

    for at in shots(&state.tower.projectiles) {
        canvas.point(at, C_SHOT_TOWER);
    }
    for c in &state.combatants {
        for at in shots(&c.projectiles) {
            canvas.point(at, C_SHOT_ENEMY);
        }
    }
    for at in shots(&state.stray_projectiles) {
        canvas.point(at, C_SHOT_ENEMY);
    }
}

// ── HUD ───────────────────────────────────────────────────────────────────────

fn draw_hud<C: Canvas + ?Sized>(canvas: &mut C, state: &MatchState) {
    let arena = &state.arena;
    let tower = &state.tower;
    let left = arena.left + 8.0;
    let top = arena.top() - LINE_HEIGHT;

    canvas.text(
        Vec2::new(left, top),
        &format!(
            "Wave {}   Kills {}/{}   Total {}   Best wave {}",
            state.wave.wave, state.wave.killed, state.wave.required, state.total_kills, state.high_score
        ),
        C_HUD,
    );
    canvas.text(
        Vec2::new(left, top - LINE_HEIGHT),
        &format!(
            "DMG {:.0}   SPD {:.2}/s   RNG {:.0}   RIC {}",
            tower.damage, tower.attack_speed, tower.range, tower.ricochet_count
        ),
        C_HUD_DIM,
    );
    if state.wave.is_boss_wave() && state.status == GameStatus::Playing {
        centered_text(canvas, Vec2::new(arena.center().x, top), "BOSS WAVE", C_BANNER);
    }

    let bar = Rect::new(left, arena.bottom + 8.0, 160.0, 8.0);
    draw_health_bar(canvas, &bar, tower.health, tower.max_health);
    canvas.text(
        Vec2::new(bar.right() + 8.0, bar.bottom),
        &format!("HP {}/{}", tower.health, tower.max_health),
        C_HUD,
    );
}

// ── Upgrade menu ──────────────────────────────────────────────────────────────

fn draw_upgrade_menu<C: Canvas + ?Sized>(canvas: &mut C, state: &MatchState) {
    let arena = &state.arena;
    canvas.fill_rect(arena, C_OVERLAY);

    let rects = card_rects(arena, state.upgrades.len());
    let row_top = rects.first().map_or(arena.center().y, Rect::top);
    let row_bottom = rects.first().map_or(arena.center().y, |r| r.bottom);

    centered_text(
        canvas,
        Vec2::new(arena.center().x, row_top + LINE_HEIGHT),
        &format!("Wave {} cleared! Choose an upgrade", state.wave.wave),
        C_HUD,
    );
    for (i, (card, rect)) in state.upgrades.iter().zip(&rects).enumerate() {
        draw_card(canvas, i, card, rect, i == state.selected_upgrade);
    }
    centered_text(
        canvas,
        Vec2::new(arena.center().x, row_bottom - LINE_HEIGHT * 1.5),
        "Arrows / 1-5 choose   Enter confirm   Double-click a card",
        C_HUD_DIM,
    );
}

fn draw_card<C: Canvas + ?Sized>(canvas: &mut C, index: usize, card: &Upgrade, rect: &Rect, selected: bool) {
    canvas.fill_rect(rect, C_CARD);
    canvas.stroke_rect(rect, if selected { C_CARD_SELECTED } else { C_CARD_FRAME });

    // "Art" panel in the upper half.
    let art = Rect::new(rect.left + 6.0, rect.center().y, rect.width - 12.0, rect.height / 2.0 - 6.0);
    canvas.stroke_rect(&art, C_CARD_FRAME);
    canvas.text(Vec2::new(art.left + 4.0, art.top() - LINE_HEIGHT), &format!("[{}]", index + 1), C_HUD_DIM);

    let text_left = rect.left + 6.0;
    let mut y = rect.center().y - LINE_HEIGHT;
    let max_chars = ((rect.width - 12.0) / GLYPH_WIDTH).max(1.0) as usize;
    let title_color = if selected { C_CARD_SELECTED } else { Color::WHITE };
    for line in wrap(&card.name, max_chars) {
        canvas.text(Vec2::new(text_left, y), &line, title_color);
        y -= LINE_HEIGHT;
    }
    for line in wrap(&card.description, max_chars) {
        if y < rect.bottom {
            break;
        }
        canvas.text(Vec2::new(text_left, y), &line, C_HUD_DIM);
        y -= LINE_HEIGHT;
    }
}

// ── Game over ─────────────────────────────────────────────────────────────────

fn draw_game_over<C: Canvas + ?Sized>(canvas: &mut C, state: &MatchState) {
    let arena = &state.arena;
    let center = arena.center();
    canvas.fill_rect(arena, C_OVERLAY);

    centered_text(canvas, Vec2::new(center.x, center.y + LINE_HEIGHT), "GAME OVER", C_BANNER);
    centered_text(
        canvas,
        center,
        &format!("Reached wave {} with {} kills", state.wave.wave, state.total_kills),
        Color::WHITE,
    );
    centered_text(
        canvas,
        Vec2::new(center.x, center.y - LINE_HEIGHT),
        &format!("Best wave {}", state.high_score),
        C_HUD,
    );
    centered_text(
        canvas,
        Vec2::new(center.x, center.y - LINE_HEIGHT * 2.0),
        "Space / Enter / R : Restart   Q : Quit",
        C_HUD_DIM,
    );
}

// ── Text helpers ──────────────────────────────────────────────────────────────

fn centered_text<C: Canvas + ?Sized>(canvas: &mut C, center: Vec2, text: &str, color: Color) {
    let width = text.chars().count() as f32 * GLYPH_WIDTH;
    canvas.text(Vec2::new(center.x - width / 2.0, center.y), text, color);
}

/// Greedy word wrap to at most `max_chars` per line.  Words longer than a
/// line are left whole.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
