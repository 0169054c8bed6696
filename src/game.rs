use log::{debug, info, trace};
use rand::rngs::StdRng;

use crate::config::GameConfig;
use crate::food::Food;
use crate::snake::{Direction, MoveResult, Snake};
use crate::Millis;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Start,
    Playing,
    GameOver,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Restart,
    Quit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameOverReason {
    Wall,
    SelfCollision,
    /// The snake covers every cell, so there is nowhere left for food.
    FieldFilled,
}

impl Phase {
    /// Phase reached by applying `command`. Commands that don't fit the phase leave it as is.
    pub fn after(self, command: Command) -> Phase {
        match (self, command) {
            (Phase::Start, Command::Start) => Phase::Playing,
            (Phase::GameOver, Command::Restart) => Phase::Playing,
            (phase, _) => phase,
        }
    }
}

pub struct SnakeGame {
    config: GameConfig,
    snake: Snake,
    food: Food,
    score: u32,
    phase: Phase,
    pending_direction: Direction,
    game_over_reason: Option<GameOverReason>,
    running: bool,
    rng: StdRng,
}

impl SnakeGame {
    pub fn new(config: GameConfig, mut rng: StdRng, now: Millis) -> Self {
        let snake = Snake::new(&config, now);
        let food = Food::new(&config, &mut rng);

        let mut game = SnakeGame {
            config,
            snake,
            food,
            score: 0,
            phase: Phase::Start,
            pending_direction: Direction::Right,
            game_over_reason: None,
            running: true,
            rng,
        };

        game.place_food();
        game
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> &Food {
        &self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.game_over_reason
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Remembers the latest requested direction. It is offered to the snake on every tick.
    pub fn request_direction(&mut self, direction: Direction) {
        self.pending_direction = direction;
    }

    pub fn handle_command(&mut self, command: Command) {
        if command == Command::Quit {
            info!("Quit requested in phase {:?}, score {}", self.phase, self.score);
            self.running = false;
            return;
        }

        let next = self.phase.after(command);
        if next == self.phase {
            debug!("Ignoring {:?} in phase {:?}", command, self.phase);
            return;
        }

        if command == Command::Restart {
            self.restart();
        }

        info!("Phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }

    /// Advances the simulation by one frame. Only does anything while playing.
    pub fn tick(&mut self, now: Millis) {
        if self.phase != Phase::Playing {
            return;
        }

        self.snake.change_direction(self.pending_direction);

        // Checked against the head left by the previous move
        let head = self.snake.head();
        let crash = if self.snake.check_unit_collision(head, 1) {
            Some(GameOverReason::SelfCollision)
        } else if self.snake.check_side_collision() {
            Some(GameOverReason::Wall)
        } else {
            None
        };

        if let Some(reason) = crash {
            info!("Game over ({:?}) at {:?}, final score {}", reason, head, self.score);
            self.game_over_reason = Some(reason);
            self.phase = Phase::GameOver;
            return;
        }

        if let MoveResult::Moved { new_head, old_tail } = self.snake.move_step(now) {
            trace!("Head {:?}, freed {:?}", new_head, old_tail);
        }

        if self.snake.head() == self.food.pos() {
            self.snake.grow();
            self.score += 1;
            debug!("Ate food at {:?}, score {}, length {}", self.food.pos(), self.score, self.snake.len());

            if self.snake.len() >= self.cell_count() {
                info!("Field filled, final score {}", self.score);
                self.game_over_reason = Some(GameOverReason::FieldFilled);
                self.phase = Phase::GameOver;
                return;
            }
            self.place_food();
        }
    }

    fn restart(&mut self) {
        self.snake.reset();
        self.food.respawn(&mut self.rng);
        self.place_food();
        self.score = 0;
        self.pending_direction = Direction::Right;
        self.game_over_reason = None;
    }

    fn cell_count(&self) -> usize {
        (self.config.columns() * self.config.rows()) as usize
    }

    /// Re-rolls the food until it lands on a cell the snake does not occupy.
    /// Callers guarantee the snake is shorter than the field has cells.
    fn place_food(&mut self) {
        while self.snake.check_unit_collision(self.food.pos(), 0) {
            self.food.respawn(&mut self.rng);
        }
    }

    #[cfg(test)]
    fn put_food_at(&mut self, cell: crate::Cell) {
        self.food.set_pos(cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const INTERVAL: Millis = 150;

    fn create_game(seed: u64) -> SnakeGame {
        SnakeGame::new(GameConfig::default(), StdRng::seed_from_u64(seed), 0)
    }

    fn started_game(seed: u64) -> SnakeGame {
        let mut game = create_game(seed);
        game.handle_command(Command::Start);
        // Park the food in a corner, away from every path used below
        game.put_food_at((0, 460));
        game
    }

    #[test]
    fn test_transition_table() {
        use Command::*;

        assert_eq!(Phase::Start.after(Start), Phase::Playing);
        assert_eq!(Phase::Start.after(Restart), Phase::Start);
        assert_eq!(Phase::Start.after(Quit), Phase::Start);
        assert_eq!(Phase::Playing.after(Start), Phase::Playing);
        assert_eq!(Phase::Playing.after(Restart), Phase::Playing);
        assert_eq!(Phase::GameOver.after(Start), Phase::GameOver);
        assert_eq!(Phase::GameOver.after(Restart), Phase::Playing);
        assert_eq!(Phase::GameOver.after(Quit), Phase::GameOver);
    }

    #[test]
    fn test_new_game_waits_on_start_screen() {
        let mut game = create_game(1);
        assert_eq!(game.phase(), Phase::Start);
        assert_eq!(game.score(), 0);
        assert!(game.is_running());
        assert!(!game.snake().check_unit_collision(game.food().pos(), 0));

        game.tick(10 * INTERVAL);
        assert_eq!(game.snake().head(), (320, 240));
    }

    #[test]
    fn test_start_leaves_state_alone() {
        let mut game = create_game(2);
        let food = game.food().pos();
        game.handle_command(Command::Start);

        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.food().pos(), food);
        assert_eq!(game.snake().len(), 3);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_playing_moves_at_interval() {
        let mut game = started_game(3);
        game.tick(100);
        assert_eq!(game.snake().head(), (320, 240));
        game.tick(150);
        assert_eq!(game.snake().head(), (340, 240));
        game.tick(160);
        assert_eq!(game.snake().head(), (340, 240));
        game.tick(300);
        assert_eq!(game.snake().head(), (360, 240));
    }

    #[test]
    fn test_direction_request_applies_on_tick() {
        let mut game = started_game(4);
        game.request_direction(Direction::Down);
        game.tick(INTERVAL);
        assert_eq!(game.snake().head(), (320, 260));
        assert_eq!(game.snake().direction(), Direction::Down);
    }

    #[test]
    fn test_locked_turn_is_retried_next_move() {
        let mut game = started_game(5);
        game.request_direction(Direction::Up);
        game.tick(10);
        game.request_direction(Direction::Left);
        game.tick(20);
        assert_eq!(game.snake().direction(), Direction::Up);

        game.tick(INTERVAL);
        assert_eq!(game.snake().head(), (320, 220));
        game.tick(INTERVAL + 16);
        assert_eq!(game.snake().direction(), Direction::Left);
        game.tick(2 * INTERVAL);
        assert_eq!(game.snake().head(), (300, 220));
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let mut game = started_game(6);
        game.put_food_at((340, 240));
        game.tick(INTERVAL);

        assert_eq!(game.snake().head(), (340, 240));
        assert_eq!(game.snake().len(), 4);
        assert_eq!(game.score(), 1);
        assert_ne!(game.food().pos(), (340, 240));
        assert!(!game.snake().check_unit_collision(game.food().pos(), 0));
    }

    #[test]
    fn test_food_on_head_is_eaten_without_moving() {
        let mut game = started_game(7);
        game.put_food_at((320, 240));
        game.tick(10);

        assert_eq!(game.snake().head(), (320, 240));
        assert_eq!(game.snake().len(), 4);
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn test_wall_game_over_fires_one_tick_late() {
        let mut game = started_game(8);
        for i in 1..=16 {
            game.tick(i * INTERVAL);
        }
        assert_eq!(game.snake().head(), (640, 240));
        assert_eq!(game.phase(), Phase::Playing);

        game.tick(16 * INTERVAL + 16);
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(game.game_over_reason(), Some(GameOverReason::Wall));

        game.tick(20 * INTERVAL);
        assert_eq!(game.snake().head(), (640, 240));
    }

    #[test]
    fn test_self_collision_ends_game() {
        let mut game = started_game(9);
        game.put_food_at((340, 240));
        game.tick(INTERVAL);
        game.put_food_at((360, 240));
        game.tick(2 * INTERVAL);
        game.put_food_at((0, 460));
        assert_eq!(game.snake().len(), 5);

        let mut now = 2 * INTERVAL;
        for dir in [Direction::Up, Direction::Left, Direction::Down].iter().copied() {
            game.request_direction(dir);
            now += INTERVAL;
            game.tick(now);
        }
        assert_eq!(game.phase(), Phase::Playing);
        assert!(game.snake().check_unit_collision(game.snake().head(), 1));

        game.tick(now + 16);
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(game.game_over_reason(), Some(GameOverReason::SelfCollision));
        assert_eq!(game.score(), 2);
    }

    #[test]
    fn test_restart_only_from_game_over() {
        let mut game = started_game(10);
        game.put_food_at((340, 240));
        game.tick(INTERVAL);
        game.put_food_at((0, 460));
        game.handle_command(Command::Restart);
        assert_eq!(game.score(), 1);
        assert_eq!(game.snake().len(), 4);

        game.request_direction(Direction::Up);
        for i in 2..=15 {
            game.tick(i * INTERVAL);
        }
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(game.score(), 1);

        game.handle_command(Command::Start);
        assert_eq!(game.phase(), Phase::GameOver);

        game.handle_command(Command::Restart);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.score(), 0);
        assert_eq!(game.game_over_reason(), None);
        assert_eq!(game.snake().len(), 3);
        assert_eq!(game.snake().head(), (320, 240));
        assert_eq!(game.snake().direction(), Direction::Right);
        assert!(!game.snake().check_unit_collision(game.food().pos(), 0));
    }

    #[test]
    fn test_restart_forgets_old_direction_request() {
        let mut game = started_game(11);
        game.request_direction(Direction::Up);
        for i in 1..=14 {
            game.tick(i * INTERVAL);
        }
        assert_eq!(game.phase(), Phase::GameOver);

        game.handle_command(Command::Restart);
        game.put_food_at((0, 460));
        game.tick(15 * INTERVAL);
        assert_eq!(game.snake().head(), (340, 240));
    }

    #[test]
    fn test_filling_the_field_ends_the_game() {
        // Three cells in a row; the snake holds two, so the food can only go on the third
        let config = GameConfig { field_width: 60, field_height: 20, initial_length: 2, ..GameConfig::default() };
        let mut game = SnakeGame::new(config, StdRng::seed_from_u64(13), 0);
        assert_eq!(game.food().pos(), (40, 0));
        game.handle_command(Command::Start);

        game.tick(INTERVAL);
        assert_eq!(game.score(), 1);
        assert_eq!(game.snake().len(), 3);
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(game.game_over_reason(), Some(GameOverReason::FieldFilled));

        for now in INTERVAL + 1..INTERVAL + 6 {
            game.tick(now);
        }
        assert_eq!(game.score(), 1);
        assert_eq!(game.snake().len(), 3);
    }

    #[test]
    fn test_quit_stops_running_in_any_phase() {
        let mut game = create_game(12);
        game.handle_command(Command::Quit);
        assert!(!game.is_running());
        assert_eq!(game.phase(), Phase::Start);
    }
}
