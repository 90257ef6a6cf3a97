use core::cell::Cell;

/// 中断使能标志与屏蔽计数。单核内核里临界区靠关中断实现，
/// 这里把标志位建模成显式状态，屏蔽期间的嵌套靠计数配对。
#[derive(Debug)]
pub struct IntrState {
    nested_level: Cell<usize>,
    /// 屏蔽之前的中断使能
    enabled_before_mask: Cell<bool>,
    enabled: Cell<bool>,
}

impl IntrState {
    pub const fn new() -> Self {
        Self {
            nested_level: Cell::new(0),
            enabled_before_mask: Cell::new(false),
            enabled: Cell::new(true),
        }
    }

    /// 关中断并返回守卫，守卫析构时在最外层恢复先前的使能位。
    pub fn mask(&self) -> IntrGuard<'_> {
        if self.nested_level.get() == 0 {
            self.enabled_before_mask.set(self.enabled.get());
        }
        self.enabled.set(false);
        self.nested_level.set(self.nested_level.get() + 1);
        IntrGuard { state: self }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }
}

impl Default for IntrState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct IntrGuard<'a> {
    state: &'a IntrState,
}

impl Drop for IntrGuard<'_> {
    fn drop(&mut self) {
        let level = self.state.nested_level.get() - 1;
        self.state.nested_level.set(level);
        if level == 0 && self.state.enabled_before_mask.get() {
            self.state.enabled.set(true);
        }
    }
}
