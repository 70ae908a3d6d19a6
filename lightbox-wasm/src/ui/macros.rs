macro_rules! ui_elements {
    {$($element:ident : $ty:ty),* $(,)?} => {
        #[derive(Clone)]
        struct Elements {
            $(
                $element: Rc<$ty>,
            )*
        }

        impl Elements {
            fn new(document: &Document) -> Result<Elements, JsValue> {
                Ok(Elements {
                    $(
                        $element: Rc::new(document
                                          .get_element_by_id(stringify!($element))
                                          .ok_or(concat!("failed to find ",
                                                         stringify!($element),
                                                         " element"))?
                                          .dyn_into::<$ty>()?),
                    )*
                })
            }
        }
    }
}

macro_rules! set_on {
    ($event:ident, $self:expr, $($element:ident),*) => {
        paste::paste! {
            $(
                $self.elements.$element.[<set_on $event>](Some(
                    $self.[<$element _on $event>]()
                        .into_js_value()
                        .unchecked_ref(),
                ));
            )*
        }
    }
}

// Defines a click handler that runs an engine method.
macro_rules! impl_onclick {
    ($($element:ident => $method:ident $(($($arg:expr),*))?),* $(,)?) => {
        paste::paste! {
            $(
                fn [<$element _onclick>](&self) -> Closure<dyn Fn()> {
                    let ui = self.clone();
                    Closure::new(move || {
                        ui.with_engine(|engine| {
                            engine.$method($($($arg),*)?);
                        });
                    })
                }
            )*
        }
    }
}

macro_rules! impl_pointer_handlers {
    ($($event:ident => $method:ident),* $(,)?) => {
        paste::paste! {
            $(
                fn [<lightbox_track_on $event>](&self) -> Closure<dyn Fn(PointerEvent)> {
                    let ui = self.clone();
                    Closure::new(move |event: PointerEvent| {
                        let input = ui.take_pointer_event(&event);
                        ui.with_engine(|engine| engine.[<on_ $method>](input));
                    })
                }
            )*
        }
    }
}
