use super::AppInfo;
use super::Event;
use super::Rect;
use super::WindowInfo;

use crate::Error;

use std::collections::VecDeque;

/// An app which creates no native windows. Each call to `run` consumes one scripted frame
/// of events and `run` returns false once the script is exhausted.
pub struct App {
    frames: VecDeque<Vec<Event>>,
    pending: Vec<Event>,
}

/// A window that only remembers the rect it was created with
#[derive(Clone)]
pub struct Window {
    info: WindowInfo,
}

#[derive(Clone, Copy)]
pub struct NativeHandle;

impl App {
    /// Queue the events delivered by one future call to `run`
    pub fn push_frame(&mut self, events: Vec<Event>) {
        self.frames.push_back(events);
    }

    /// Queue `count` frames without any events
    pub fn push_idle_frames(&mut self, count: usize) {
        for _ in 0..count {
            self.frames.push_back(Vec::new());
        }
    }
}

impl super::App for App {
    type Window = Window;
    type NativeHandle = NativeHandle;

    fn create(_info: AppInfo) -> Result<Self, Error> {
        Ok(App {
            frames: VecDeque::new(),
            pending: Vec::new(),
        })
    }

    fn create_window(&mut self, info: WindowInfo) -> Result<Window, Error> {
        Ok(Window {
            info
        })
    }

    fn run(&mut self) -> bool {
        match self.frames.pop_front() {
            Some(events) => {
                self.pending.extend(events);
                true
            }
            None => false
        }
    }

    fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.pending)
    }
}

impl super::Window<App> for Window {
    fn show(&self) {
    }

    fn get_viewport_rect(&self) -> Rect<i32> {
        Rect {
            x: 0,
            y: 0,
            width: self.info.rect.width,
            height: self.info.rect.height,
        }
    }

    fn get_native_handle(&self) -> NativeHandle {
        NativeHandle
    }
}

impl super::NativeHandle<App> for NativeHandle {
    fn get_isize(&self) -> isize {
        0
    }
}
