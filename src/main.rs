use std::sync::Arc;

use winit::event::WindowEvent;
use winit::window::Window;

use robot_stage::app::{App, AppHandler};
use robot_stage::engine::{Engine, FrameState};
use robot_stage::render::RendererSettings;
use robot_stage::stage::{Stage, StageSettings};
use robot_stage::utils::fps_counter::FpsCounter;

const TITLE: &str = "Robot Stage";

struct RobotStageApp {
    stage: Stage,
    fps_counter: FpsCounter,
}

impl AppHandler for RobotStageApp {
    fn init(engine: &mut Engine, window: &Arc<Window>) -> Self {
        let mut stage = Stage::new(StageSettings::default());

        let size = window.inner_size();
        stage.handle_resize(size.width, size.height);
        engine.input.inject_resize(size.width, size.height);

        stage.start_loading();

        Self {
            stage,
            fps_counter: FpsCounter::new(),
        }
    }

    fn on_event(&mut self, _engine: &mut Engine, _window: &Arc<Window>, event: &WindowEvent) -> bool {
        if let WindowEvent::Resized(size) = event {
            self.stage.handle_resize(size.width, size.height);
        }
        false
    }

    fn update(&mut self, engine: &mut Engine, window: &Arc<Window>, frame: &FrameState) {
        self.stage.update(&engine.input, frame);

        if let Some(fps) = self.fps_counter.frame() {
            window.set_title(&format!("{TITLE} | FPS: {fps:.2}"));
        }
    }

    fn render(&mut self, engine: &mut Engine) {
        engine.render_scene(&self.stage.scene, &self.stage.assets);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    App::new()
        .with_title(TITLE)
        .with_settings(RendererSettings::default())
        .run::<RobotStageApp>()?;
    Ok(())
}
