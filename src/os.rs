/// Implements this interface for windows win32 platfrom
#[cfg(target_os = "windows")]
pub mod win32;

/// Scripted platform without native windows, events are supplied frame by frame by the caller
pub mod null;

use serde::{Deserialize, Serialize};

use std::any::Any;

use crate::Error;

/// Describes a rectangle starting at the top left corner specified by x,y
/// with the size of width and height.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect<T> {
    pub x: T,
    pub y: T,
    pub width: T,
    pub height: T,
}

/// Information to create an app
pub struct AppInfo {
    /// Name of the application, used to register the window class
    pub name: String,
}

/// Filled out to specify various window parameters
/// when a window is created by `App::create_window`
#[derive(Clone)]
pub struct WindowInfo {
    /// Title displayed in the title bar
    pub title: String,
    /// Position of the window and size of the client area
    pub rect: Rect<i32>,
}

/// Directional and control keys the labs respond to, other keys are not forwarded
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Escape,
}

/// Events translated from native window messages and consumed by `client::Client::dispatch`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    KeyDown(Key),
    KeyUp(Key),
    /// New client area size, zero-area sizes are never produced by a platform
    Resize {
        width: u32,
        height: u32,
    },
    Close,
}

/// Wraps the native handle a swap chain needs to present into a window
pub trait NativeHandle<A: App> {
    fn get_isize(&self) -> isize;
}

/// An interface which all platforms need to implement for general operating system calls
pub trait App: 'static + Any + Sized {
    type Window: Window<Self>;
    type NativeHandle: NativeHandle<Self>;
    /// Create an application instance
    fn create(info: AppInfo) -> Result<Self, Error>;
    /// Create a new operating system window
    fn create_window(&mut self, info: WindowInfo) -> Result<Self::Window, Error>;
    /// Pump pending messages, returns false once the app has been asked to quit
    fn run(&mut self) -> bool;
    /// Drain the events collected since the last call
    fn take_events(&mut self) -> Vec<Event>;
}

/// An instance of an operating system window
pub trait Window<A: App>: Any + Sized {
    /// Show the window and bring it to the front
    fn show(&self);
    /// Returns the client area as a rect positioned at 0,0
    fn get_viewport_rect(&self) -> Rect<i32>;
    /// Returns the internal native handle
    fn get_native_handle(&self) -> A::NativeHandle;
}

/// Returns true if both dimensions of a resize are non zero
pub fn is_valid_size(width: u32, height: u32) -> bool {
    width > 0 && height > 0
}
