use kiss3d::{
    event::{Action, Key, WindowEvent},
    light::Light,
    window::{State, Window},
};

pub struct PointAndColor {
    pub point: [f32; 3],
    pub color: [f32; 3],
}

/// Renders the first batch of points; 'n' replaces it with the next one.
pub fn run_gui<I>(mut iter: I)
where
    I: Iterator<Item = Vec<PointAndColor>> + 'static,
{
    let mut window = Window::new("las-tool");
    window.set_light(Light::StickToCamera);
    window.set_point_size(2.0);

    let points = iter.next();
    let gui = Gui { iter, points };
    window.render_loop(gui);
}

struct Gui<I>
where
    I: Iterator<Item = Vec<PointAndColor>>,
{
    iter: I,
    points: Option<Vec<PointAndColor>>,
}

impl<I> State for Gui<I>
where
    I: Iterator<Item = Vec<PointAndColor>> + 'static,
{
    fn step(&mut self, window: &mut Window) {
        let go_next = window.events().iter().any(|evt| {
            matches!(
                evt.value,
                WindowEvent::Key(Key::N, Action::Press, modifiers) if modifiers.is_empty()
            )
        });

        if go_next {
            if let Some(points) = self.iter.next() {
                self.points = Some(points);
            }
        }

        if let Some(points) = &self.points {
            for item in points {
                let PointAndColor { point, color } = *item;
                window.draw_point(&point.into(), &color.into());
            }
        }
    }
}
