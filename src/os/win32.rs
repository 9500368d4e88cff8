use windows::{
    core::*,
    Win32::Foundation::*,
    Win32::Graphics::Gdi::ValidateRect,
    Win32::Graphics::Gdi::UpdateWindow,
    Win32::System::LibraryLoader::GetModuleHandleW,
    Win32::UI::Input::KeyboardAndMouse::*,
    Win32::UI::WindowsAndMessaging::*,
};

use super::AppInfo;
use super::Event;
use super::Key;
use super::Rect;
use super::WindowInfo;

use std::cell::RefCell;

pub struct App {
    window_class: HSTRING,
    hinstance: HINSTANCE,
    quit: bool,
}

pub struct Window {
    hwnd: HWND,
    info: WindowInfo,
}

#[derive(Clone, Copy)]
pub struct NativeHandle {
    pub hwnd: HWND,
}

// the window procedure runs on the thread pumping messages, which is also the render thread
thread_local! {
    static PROC_EVENTS: RefCell<Vec<Event>> = const { RefCell::new(Vec::new()) };
}

fn push_event(event: Event) {
    PROC_EVENTS.with(|events| events.borrow_mut().push(event));
}

impl Drop for Window {
    fn drop(&mut self) {
        unsafe {
            if IsWindow(self.hwnd).as_bool() {
                let _ = DestroyWindow(self.hwnd);
            }
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        unsafe {
            let _ = UnregisterClassW(&self.window_class, self.hinstance);
        }
    }
}

impl super::App for App {
    type Window = Window;
    type NativeHandle = NativeHandle;

    fn create(info: AppInfo) -> std::result::Result<Self, crate::Error> {
        unsafe {
            let instance: HINSTANCE = GetModuleHandleW(None)?.into();
            let window_class = HSTRING::from(info.name.as_str());

            let wc = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(wndproc),
                hInstance: instance,
                hCursor: LoadCursorW(None, IDC_ARROW)?,
                lpszClassName: PCWSTR(window_class.as_ptr()),
                ..Default::default()
            };

            if RegisterClassExW(&wc) == 0 {
                return Err(crate::Error {
                    msg: format!("hotline_labs::os::win32: failed to register window class {}", info.name)
                });
            }

            Ok(App {
                window_class,
                hinstance: instance,
                quit: false,
            })
        }
    }

    fn create_window(&mut self, info: WindowInfo) -> std::result::Result<Window, crate::Error> {
        unsafe {
            // grow the outer rect so the client area matches the requested size
            let mut rect = RECT {
                left: 0,
                top: 0,
                right: info.rect.width,
                bottom: info.rect.height,
            };
            AdjustWindowRect(&mut rect, WS_OVERLAPPEDWINDOW, FALSE)?;

            let hwnd = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                &self.window_class,
                &HSTRING::from(info.title.as_str()),
                WS_OVERLAPPEDWINDOW,
                info.rect.x,
                info.rect.y,
                rect.right - rect.left,
                rect.bottom - rect.top,
                HWND::default(),
                HMENU::default(),
                self.hinstance,
                None,
            )?;

            log::info!("hotline_labs::os::win32: created window '{}' {}x{}", info.title, info.rect.width, info.rect.height);

            Ok(Window {
                hwnd,
                info,
            })
        }
    }

    fn run(&mut self) -> bool {
        unsafe {
            let mut msg = MSG::default();
            while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).as_bool() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
                if msg.message == WM_QUIT {
                    self.quit = true;
                }
            }
            !self.quit
        }
    }

    fn take_events(&mut self) -> Vec<Event> {
        PROC_EVENTS.with(|events| std::mem::take(&mut *events.borrow_mut()))
    }
}

impl super::Window<App> for Window {
    fn show(&self) {
        unsafe {
            let _ = ShowWindow(self.hwnd, SW_SHOW);
            let _ = UpdateWindow(self.hwnd);
        }
    }

    fn get_viewport_rect(&self) -> Rect<i32> {
        let mut client = RECT::default();
        let ok = unsafe { GetClientRect(self.hwnd, &mut client) }.is_ok();
        if ok {
            Rect {
                x: 0,
                y: 0,
                width: client.right - client.left,
                height: client.bottom - client.top,
            }
        }
        else {
            Rect {
                x: 0,
                y: 0,
                width: self.info.rect.width,
                height: self.info.rect.height,
            }
        }
    }

    fn get_native_handle(&self) -> NativeHandle {
        NativeHandle {
            hwnd: self.hwnd
        }
    }
}

impl super::NativeHandle<App> for NativeHandle {
    fn get_isize(&self) -> isize {
        self.hwnd.0 as isize
    }
}

/// Shows a blocking message box, used by the lab binaries to report fatal start-up errors
pub fn show_error_message(title: &str, msg: &str) {
    unsafe {
        MessageBoxW(
            HWND::default(),
            &HSTRING::from(msg),
            &HSTRING::from(title),
            MB_ICONERROR
        );
    }
}

fn translate_key(wparam: WPARAM) -> Option<Key> {
    match VIRTUAL_KEY(wparam.0 as u16) {
        VK_LEFT => Some(Key::Left),
        VK_RIGHT => Some(Key::Right),
        VK_UP => Some(Key::Up),
        VK_DOWN => Some(Key::Down),
        VK_ESCAPE => Some(Key::Escape),
        _ => None
    }
}

extern "system" fn wndproc(window: HWND, message: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    unsafe {
        match message {
            WM_SIZE => {
                let width = (lparam.0 & 0xffff) as u32;
                let height = ((lparam.0 >> 16) & 0xffff) as u32;
                if wparam.0 as u32 != SIZE_MINIMIZED && super::is_valid_size(width, height) {
                    push_event(Event::Resize { width, height });
                }
                LRESULT(0)
            }
            WM_KEYDOWN => {
                if let Some(key) = translate_key(wparam) {
                    push_event(Event::KeyDown(key));
                }
                LRESULT(0)
            }
            WM_KEYUP => {
                if let Some(key) = translate_key(wparam) {
                    push_event(Event::KeyUp(key));
                }
                LRESULT(0)
            }
            WM_PAINT => {
                let _ = ValidateRect(window, None);
                LRESULT(0)
            }
            WM_DESTROY => {
                push_event(Event::Close);
                PostQuitMessage(0);
                LRESULT(0)
            }
            _ => DefWindowProcW(window, message, wparam, lparam),
        }
    }
}
