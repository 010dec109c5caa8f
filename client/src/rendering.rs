use crate::game::{ClientSession, Status};
use macroquad::prelude::*;
use shared::{Role, Tile};

const TILE_SIZE: f32 = 24.0;
const MARGIN: f32 = 10.0;
const LINE_HEIGHT: f32 = 22.0;
const FONT_SIZE: f32 = 20.0;

/// Draws the status lines followed by the map grid, one frame at a time.
pub struct Renderer {
    background: Color,
    wall: Color,
    point: Color,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            background: Color::from_rgba(26, 26, 26, 255),
            wall: Color::from_rgba(40, 60, 200, 255),
            point: Color::from_rgba(255, 200, 160, 255),
        }
    }

    pub fn render(&self, session: &ClientSession) {
        clear_background(self.background);

        let mut y = MARGIN + FONT_SIZE;
        draw_text(&self.title(session), MARGIN, y, FONT_SIZE, WHITE);
        y += LINE_HEIGHT;
        draw_text(&session.message_line(), MARGIN, y, FONT_SIZE, YELLOW);
        y += LINE_HEIGHT;
        draw_text(&session.attempts_line(), MARGIN, y, FONT_SIZE, WHITE);
        y += LINE_HEIGHT / 2.0;

        self.draw_grid(session, y);
    }

    fn title(&self, session: &ClientSession) -> String {
        let status = match session.status() {
            Status::Waiting => "waiting",
            Status::Playing if session.is_frozen() => "frozen",
            Status::Playing => "playing",
            Status::GameOver => "game over",
        };
        format!("cman | {} | {}", session.role(), status)
    }

    fn draw_grid(&self, session: &ClientSession, top: f32) {
        for (row, tiles) in session.map().rows().enumerate() {
            for (col, tile) in tiles.iter().enumerate() {
                let x = MARGIN + col as f32 * TILE_SIZE;
                let y = top + row as f32 * TILE_SIZE;
                self.draw_tile(*tile, x, y, session.role());
            }
        }
    }

    fn draw_tile(&self, tile: Tile, x: f32, y: f32, role: Role) {
        let center_x = x + TILE_SIZE / 2.0;
        let center_y = y + TILE_SIZE / 2.0;

        match tile {
            Tile::Wall => draw_rectangle(x, y, TILE_SIZE, TILE_SIZE, self.wall),
            Tile::Floor => {}
            Tile::Point => draw_circle(center_x, center_y, TILE_SIZE / 8.0, self.point),
            Tile::Cman => {
                draw_circle(center_x, center_y, TILE_SIZE * 0.4, YELLOW);
                if role == Role::Cman {
                    draw_circle_lines(center_x, center_y, TILE_SIZE * 0.45, 2.0, WHITE);
                }
            }
            Tile::Ghost => {
                let size = TILE_SIZE * 0.8;
                let left = x + TILE_SIZE * 0.1;
                let top = y + TILE_SIZE * 0.1;
                draw_circle(center_x, top + size / 2.0, size / 2.0, RED);
                draw_rectangle(left, top + size / 2.0, size, size / 2.0, RED);
                if role == Role::Ghost {
                    draw_rectangle_lines(left, top, size, size, 2.0, WHITE);
                }
            }
            Tile::Other(c) => {
                draw_text(&c.to_string(), x + 4.0, y + TILE_SIZE - 6.0, FONT_SIZE, GRAY);
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
