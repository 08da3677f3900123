/// FrameDriver: runs the per-frame container lifecycle in order.
///
/// ```text
/// tick ─► async_tick (worker) ─► join ─► swap_data ─► dirty_check
///             ▲
///             └── read-only work (visibility queries) may run here
/// ```
///
/// `swap_data` never starts before every `async_tick` of the frame has
/// returned. There is no timeout: a stalled worker blocks the join.

use std::thread;
use crate::container::InstanceContainer;

#[derive(Debug, Default)]
pub struct FrameDriver {
    frame_count: u64,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed frames.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Simulation step only: `tick()` on every container.
    pub fn tick<C: InstanceContainer>(&self, containers: &[C]) {
        for container in containers {
            container.tick();
        }
    }

    /// Run one full frame.
    pub fn run_frame<C: InstanceContainer>(&mut self, containers: &mut [C]) {
        self.run_frame_with(containers, |_| {});
    }

    /// Run one full frame, calling `concurrent` on the driver thread while
    /// the worker runs `async_tick`. `concurrent` only gets shared access.
    ///
    /// A panic on the worker is re-raised here after the join.
    pub fn run_frame_with<C, F>(&mut self, containers: &mut [C], concurrent: F)
    where
        C: InstanceContainer,
        F: FnOnce(&[C]),
    {
        self.tick(containers);

        let shared: &[C] = containers;
        thread::scope(|scope| {
            let worker = thread::Builder::new()
                .name("galaxy3d-async-tick".to_string())
                .spawn_scoped(scope, move || {
                    for container in shared {
                        container.async_tick();
                    }
                });

            match worker {
                Ok(handle) => {
                    concurrent(shared);
                    if let Err(payload) = handle.join() {
                        std::panic::resume_unwind(payload);
                    }
                }
                Err(error) => {
                    crate::index_warn!("galaxy3d::FrameDriver",
                        "Could not spawn async tick worker ({}), running inline", error);
                    for container in shared {
                        container.async_tick();
                    }
                    concurrent(shared);
                }
            }
        });

        for container in containers.iter_mut() {
            container.swap_data();
            container.dirty_check();
        }

        self.frame_count += 1;
        crate::index_trace!("galaxy3d::FrameDriver",
            "Frame {} done ({} container(s))", self.frame_count, containers.len());
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
