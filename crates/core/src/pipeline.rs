//! 싱크 trait -- 완성된 엔트리를 받는 확장 포인트 정의

use crate::error::LogdroidError;

/// 완성된 엔트리를 받아 처리하는 싱크
///
/// 파서는 엔트리가 확정될 때마다 [`accept`](EntrySink::accept)를 호출하고,
/// 입력이 모두 끝나면 [`commit`](EntrySink::commit)을 한 번 호출합니다.
pub trait EntrySink<E> {
    /// 싱크 이름
    fn name(&self) -> &str;

    /// 확정된 엔트리를 받습니다.
    fn accept(&mut self, entry: &E) -> Result<(), LogdroidError>;

    /// 남은 출력을 내보내고 자원을 정리합니다.
    fn commit(&mut self) -> Result<(), LogdroidError>;
}

/// 여러 싱크에 같은 엔트리를 순서대로 전달하는 팬아웃
///
/// 등록 순서대로 알리며, 하나라도 실패하면 즉시 에러를 전파합니다.
pub struct FanOut<E> {
    sinks: Vec<Box<dyn EntrySink<E>>>,
}

impl<E> FanOut<E> {
    /// 빈 팬아웃을 생성합니다.
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// 싱크를 등록합니다.
    pub fn register(mut self, sink: Box<dyn EntrySink<E>>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// 등록된 싱크 수
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// 등록된 싱크가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// 등록된 싱크 이름 목록
    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }
}

impl<E> Default for FanOut<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EntrySink<E> for FanOut<E> {
    fn name(&self) -> &str {
        "fan-out"
    }

    fn accept(&mut self, entry: &E) -> Result<(), LogdroidError> {
        for sink in &mut self.sinks {
            sink.accept(entry)?;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), LogdroidError> {
        for sink in &mut self.sinks {
            sink.commit()?;
        }
        Ok(())
    }
}

/// 엔트리를 그대로 모으는 싱크 (테스트와 후처리용)
impl<E: Clone> EntrySink<E> for Vec<E> {
    fn name(&self) -> &str {
        "collect"
    }

    fn accept(&mut self, entry: &E) -> Result<(), LogdroidError> {
        self.push(entry.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), LogdroidError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::error::StorageError;

    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl EntrySink<u32> for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn accept(&mut self, entry: &u32) -> Result<(), LogdroidError> {
            self.log.borrow_mut().push(format!("{}:{entry}", self.name));
            Ok(())
        }

        fn commit(&mut self) -> Result<(), LogdroidError> {
            self.log.borrow_mut().push(format!("{}:commit", self.name));
            Ok(())
        }
    }

    struct Failing;

    impl EntrySink<u32> for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn accept(&mut self, _entry: &u32) -> Result<(), LogdroidError> {
            Err(StorageError::Query("disk full".to_owned()).into())
        }

        fn commit(&mut self) -> Result<(), LogdroidError> {
            Ok(())
        }
    }

    #[test]
    fn fan_out_notifies_sinks_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut fan = FanOut::new()
            .register(Box::new(Recorder {
                name: "a",
                log: Rc::clone(&log),
            }))
            .register(Box::new(Recorder {
                name: "b",
                log: Rc::clone(&log),
            }));

        fan.accept(&1).unwrap();
        fan.accept(&2).unwrap();
        fan.commit().unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["a:1", "b:1", "a:2", "b:2", "a:commit", "b:commit"]
        );
        assert_eq!(fan.sink_names(), vec!["a", "b"]);
    }

    #[test]
    fn fan_out_propagates_first_error() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut fan = FanOut::new().register(Box::new(Failing)).register(Box::new(Recorder {
            name: "after",
            log: Rc::clone(&log),
        }));

        assert!(fan.accept(&7).is_err());
        assert!(log.borrow().is_empty(), "later sinks must not see the entry");
    }

    #[test]
    fn empty_fan_out() {
        let mut fan: FanOut<u32> = FanOut::default();
        assert!(fan.is_empty());
        fan.accept(&1).unwrap();
        fan.commit().unwrap();
    }

    #[test]
    fn vec_sink_collects() {
        let mut sink: Vec<u32> = Vec::new();
        sink.accept(&3).unwrap();
        sink.accept(&4).unwrap();
        assert_eq!(sink, vec![3, 4]);
    }
}
