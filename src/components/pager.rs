//! Image pager.
//!
//! The slot elements are created once and keyed by physical slot id, so a
//! ring rotation only moves existing nodes and their images stay loaded.

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use leptos_icons::Icon;
use suzuno_core::gesture::PointerId;
use suzuno_core::view::{PagerSurface, SlideFrame, SlotRender};
use suzuno_core::{Address, GestureEvent, GestureTracker};

use crate::app::{AppContext, Dispatcher};
use crate::components::icons as ic;
use crate::components::tagger::TagButtons;
use crate::utils::dom;

stylance::import_crate_style!(css, "src/components/pager.module.css");

/// Pointer id used for the mouse, which never collides with touch ids.
const MOUSE_POINTER: PointerId = -1;

// =============================================================================
// State
// =============================================================================

#[derive(Clone, Copy)]
pub struct PagerState {
    /// Half-width of the window in slots.
    pub extra_pages: usize,
    /// Physical slot ids, first to last.
    pub order: RwSignal<Vec<usize>>,
    /// Content of each physical slot, indexed by slot id.
    pub slots: StoredValue<Vec<RwSignal<SlotRender>>>,
    pub slide: RwSignal<SlideFrame>,
    pub active: RwSignal<bool>,
    pub toolbox_visible: RwSignal<bool>,
    pub back_link: RwSignal<String>,
}

impl PagerState {
    pub fn new(extra_pages: usize) -> Self {
        let count = extra_pages * 2 + 1;
        Self {
            extra_pages,
            order: RwSignal::new((0..count).collect()),
            slots: StoredValue::new((0..count).map(|_| RwSignal::new(SlotRender::Blank)).collect()),
            slide: RwSignal::new(SlideFrame {
                page_shift: 0,
                offset_px: 0.0,
                animated: false,
            }),
            active: RwSignal::new(false),
            toolbox_visible: RwSignal::new(false),
            back_link: RwSignal::new(String::new()),
        }
    }

    fn slot(&self, id: usize) -> Option<RwSignal<SlotRender>> {
        self.slots.with_value(|slots| slots.get(id).copied())
    }
}

// =============================================================================
// Controller Adapter
// =============================================================================

pub struct PagerDom {
    state: PagerState,
    dispatcher: Dispatcher,
}

impl PagerDom {
    pub fn new(state: PagerState, dispatcher: Dispatcher) -> Self {
        Self { state, dispatcher }
    }
}

impl PagerSurface for PagerDom {
    fn arrange(&mut self, order: &[usize]) {
        self.state.order.set(order.to_vec());
    }

    fn render_slot(&mut self, slot: usize, render: &SlotRender) {
        if let Some(signal) = self.state.slot(slot) {
            // unchanged renders must not touch the image element
            if signal.with_untracked(|current| current != render) {
                signal.set(render.clone());
            }
        }
    }

    fn request_frame(&mut self) {
        let dispatcher = self.dispatcher;
        dom::request_after_redraw(move || dispatcher.dispatch(|c| c.on_animation_frame()));
    }

    fn apply_slide(&mut self, frame: SlideFrame) {
        self.state.slide.set(frame);
    }

    fn set_active(&mut self, active: bool) {
        self.state.active.set(active);
    }

    fn set_toolbox_visible(&mut self, visible: bool) {
        self.state.toolbox_visible.set(visible);
    }

    fn schedule_toolbox_check(&mut self, delay_ms: f64) {
        let dispatcher = self.dispatcher;
        Timeout::new(delay_ms.max(0.0) as u32, move || {
            dispatcher.dispatch(|c| c.on_toolbox_timer());
        })
        .forget();
    }

    fn set_back_link(&mut self, link: &Address) {
        self.state.back_link.set(link.to_string());
    }
}

/// CSS transform placing the slot container for `frame`.
fn slide_transform(extra_pages: usize, frame: &SlideFrame) -> String {
    let base = (extra_pages as isize + frame.page_shift) * -100;
    format!("translateX({base}%) translateX({}px)", frame.offset_px)
}

// =============================================================================
// Components
// =============================================================================

#[component]
pub fn Pager() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let pager = ctx.pager;
    let dispatcher = ctx.dispatcher;

    let tracker = StoredValue::new(GestureTracker::new(&ctx.pager_config));
    let report = move |event: Option<GestureEvent>| {
        if let Some(event) = event {
            dispatcher.dispatch(move |c| c.pager_gesture(event));
        }
    };
    let track = move |f: &dyn Fn(&mut GestureTracker) -> Option<GestureEvent>| {
        report(tracker.try_update_value(|t| f(t)).flatten());
    };

    let on_touch_start = move |ev: leptos::ev::TouchEvent| {
        let touches = ev.changed_touches();
        for i in 0..touches.length() {
            if let Some(touch) = touches.get(i) {
                let (x, y) = (f64::from(touch.client_x()), f64::from(touch.client_y()));
                track(&|t| t.start(PointerId::from(touch.identifier()), x, y));
            }
        }
    };
    let on_touch_move = move |ev: leptos::ev::TouchEvent| {
        let touches = ev.changed_touches();
        for i in 0..touches.length() {
            if let Some(touch) = touches.get(i) {
                let (x, y) = (f64::from(touch.client_x()), f64::from(touch.client_y()));
                track(&|t| t.move_to(PointerId::from(touch.identifier()), x, y));
            }
        }
    };
    let on_touch_end = move |ev: leptos::ev::TouchEvent| {
        // suppress the emulated mouse events that would count the tap twice
        ev.prevent_default();
        let viewport = dom::viewport();
        let touches = ev.changed_touches();
        for i in 0..touches.length() {
            if let Some(touch) = touches.get(i) {
                track(&|t| t.end(PointerId::from(touch.identifier()), viewport));
            }
        }
    };
    let on_touch_cancel = move |ev: leptos::ev::TouchEvent| {
        let touches = ev.changed_touches();
        for i in 0..touches.length() {
            if let Some(touch) = touches.get(i) {
                track(&|t| t.cancel(PointerId::from(touch.identifier())));
            }
        }
    };

    let on_mouse_down = move |ev: leptos::ev::MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        let (x, y) = (f64::from(ev.client_x()), f64::from(ev.client_y()));
        track(&|t| t.start(MOUSE_POINTER, x, y));
    };
    let on_mouse_move = move |ev: leptos::ev::MouseEvent| {
        let (x, y) = (f64::from(ev.client_x()), f64::from(ev.client_y()));
        track(&|t| t.move_to(MOUSE_POINTER, x, y));
    };
    let on_mouse_up = move |_: leptos::ev::MouseEvent| {
        let viewport = dom::viewport();
        track(&|t| t.end(MOUSE_POINTER, viewport));
    };
    let on_mouse_leave = move |_: leptos::ev::MouseEvent| {
        track(&|t| t.cancel(MOUSE_POINTER));
    };

    let root_class = move || {
        let mut class = css::pager.to_string();
        if pager.active.get() {
            class.push(' ');
            class.push_str(css::active);
        }
        if pager.toolbox_visible.get() {
            class.push(' ');
            class.push_str(css::toolboxVisible);
        }
        class
    };
    let container_class = move || {
        if pager.slide.get().animated {
            format!("{} {}", css::container, css::animated)
        } else {
            css::container.to_string()
        }
    };
    let transform = move || slide_transform(pager.extra_pages, &pager.slide.get());

    let on_back = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        let target = Address::parse(&pager.back_link.get_untracked());
        dispatcher.dispatch(move |c| c.back_requested(target));
    };

    view! {
        <section class=root_class aria-hidden=move || (!pager.active.get()).to_string()>
            <div
                class=css::viewport
                on:touchstart=on_touch_start
                on:touchmove=on_touch_move
                on:touchend=on_touch_end
                on:touchcancel=on_touch_cancel
                on:mousedown=on_mouse_down
                on:mousemove=on_mouse_move
                on:mouseup=on_mouse_up
                on:mouseleave=on_mouse_leave
            >
                <div class=container_class style:transform=transform>
                    <For
                        each=move || pager.order.get()
                        key=|id| *id
                        children=move |id| view! { <PageSlot id=id /> }
                    />
                </div>
            </div>

            <nav class=css::toolbar>
                <a class=css::toolButton href=move || pager.back_link.get() on:click=on_back>
                    <Icon icon=ic::BACK />
                </a>
                <button
                    class=css::toolButton
                    aria-label="Rotate"
                    on:click=move |_| dispatcher.dispatch(|c| c.rotate_current_page())
                >
                    <Icon icon=ic::ROTATE />
                </button>
                <TagButtons />
            </nav>
        </section>
    }
}

/// One physical slot.
#[component]
fn PageSlot(id: usize) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let dispatcher = ctx.dispatcher;
    let Some(slot) = ctx.pager.slot(id) else {
        return ().into_any();
    };

    let page = move || match slot.get() {
        SlotRender::Page(page) => Some(page),
        SlotRender::Blank => None,
    };

    let page_class = move || match slot.get() {
        SlotRender::Blank => format!("{} {}", css::page, css::blank),
        SlotRender::Page(page) if !page.visible => format!("{} {}", css::page, css::distant),
        SlotRender::Page(_) => css::page.to_string(),
    };
    let image_class = move || {
        let mut class = css::image.to_string();
        if let Some(page) = page() {
            if page.animated {
                class.push(' ');
                class.push_str(css::rotating);
            }
            if page.landscape() {
                class.push(' ');
                class.push_str(css::landscape);
            }
        }
        class
    };
    let image_transform = move || {
        page()
            .map(|page| format!("rotate({}deg)", page.rotation_deg()))
            .unwrap_or_default()
    };

    let settled = move || dispatcher.dispatch(move |c| c.on_image_settled(id));

    view! {
        <div class=page_class data-slot=id.to_string()>
            <img
                class=image_class
                style:transform=image_transform
                src=move || page().and_then(|p| p.source)
                alt=""
                draggable="false"
                on:load=move |_| settled()
                on:error=move |_| settled()
            />
            <header class=css::pageInfo>
                <span class=css::pageName>{move || page().map(|p| p.name).unwrap_or_default()}</span>
                <span class=css::pageSize>
                    {move || page().map(|p| p.size_text).unwrap_or_default()}
                </span>
                {move || {
                    page()
                        .and_then(|p| p.download_url)
                        .map(|url| {
                            view! {
                                <a class=css::toolButton href=url download="">
                                    <Icon icon=ic::DOWNLOAD />
                                </a>
                            }
                        })
                }}
            </header>
        </div>
    }
    .into_any()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_transform_neutral() {
        let frame = SlideFrame {
            page_shift: 0,
            offset_px: 0.0,
            animated: false,
        };
        assert_eq!(slide_transform(2, &frame), "translateX(-200%) translateX(0px)");
    }

    #[test]
    fn test_slide_transform_shifted_and_dragged() {
        let frame = SlideFrame {
            page_shift: -1,
            offset_px: -42.5,
            animated: true,
        };
        assert_eq!(slide_transform(2, &frame), "translateX(-100%) translateX(-42.5px)");
    }
}
