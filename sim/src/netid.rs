//! `NetId` allocation (`spec.md` §3.1, §5 "NetId counter: exclusive to
//! simulation thread"): a monotonic counter starting at a configured base,
//! upholding I4 (a NetId is present in at most one entity at any instant)
//! by construction — it is simply never handed out twice.

use rt_proto::messages::NetId;

pub struct NetIdAllocator {
    next: NetId,
}

impl NetIdAllocator {
    pub fn new(base: NetId) -> Self {
        NetIdAllocator { next: base }
    }

    pub fn allocate(&mut self) -> NetId {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}
